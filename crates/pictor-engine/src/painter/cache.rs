use std::collections::HashMap;

use anyhow::{Context, Result, ensure};

use crate::device::{ColormapId, Display, DisplayId, SurfaceDescriptor, VisualId};

use super::painter::{Painter, PainterInit};

/// Reference to a cached painter.
///
/// The generation changes whenever the slot is reused, so a handle kept
/// past `collect_garbage` no longer resolves.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PainterHandle {
    index: u32,
    generation: u32,
}

/// Everything that makes two surfaces paint identically.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct PainterKey {
    display: DisplayId,
    colormap: ColormapId,
    visual: VisualId,
    depth: u8,
    bits_per_pixel: u8,
    gamma_bits: u32,
}

impl PainterKey {
    fn of(d: &SurfaceDescriptor) -> Self {
        Self {
            display: d.display,
            colormap: d.colormap,
            visual: d.visual.id,
            depth: d.depth,
            bits_per_pixel: d.bits_per_pixel,
            gamma_bits: d.gamma.to_bits(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    key: PainterKey,
    painter: Painter,
    refs: u32,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Reference-counted painters shared by surfaces with the same format.
///
/// Releasing the last reference only marks a painter unused; device colors
/// are returned by [`PainterCache::collect_garbage`]. A painter acquired
/// again before collection is reused as is.
#[derive(Debug, Default)]
pub struct PainterCache {
    init: PainterInit,
    slots: Vec<Slot>,
    free: Vec<u32>,
    lookup: HashMap<PainterKey, u32>,
}

impl PainterCache {
    pub fn new(init: PainterInit) -> Self {
        Self { init, ..Self::default() }
    }

    /// Returns the painter for `descriptor`, building it on first use.
    pub fn acquire(
        &mut self,
        display: &mut dyn Display,
        descriptor: &SurfaceDescriptor,
    ) -> Result<PainterHandle> {
        ensure!(
            display.id() == descriptor.display,
            "surface belongs to display {:?}, not {:?}",
            descriptor.display,
            display.id()
        );

        let key = PainterKey::of(descriptor);
        if let Some(&index) = self.lookup.get(&key) {
            let slot = &mut self.slots[index as usize];
            if let Some(entry) = slot.entry.as_mut() {
                entry.refs += 1;
                log::debug!("painter cache hit (slot {index}, {} refs)", entry.refs);
                return Ok(PainterHandle { index, generation: slot.generation });
            }
        }

        log::debug!(
            "painter cache miss for {:?} depth {}",
            descriptor.visual.class,
            descriptor.depth
        );
        let painter = Painter::new(display, descriptor, &self.init).with_context(|| {
            format!(
                "failed to create painter for {:?} visual at depth {}",
                descriptor.visual.class, descriptor.depth
            )
        })?;

        let entry = Entry { key, painter, refs: 1 };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].entry = Some(entry);
                index
            }
            None => {
                self.slots.push(Slot { generation: 0, entry: Some(entry) });
                (self.slots.len() - 1) as u32
            }
        };
        self.lookup.insert(key, index);
        Ok(PainterHandle { index, generation: self.slots[index as usize].generation })
    }

    /// Drops one reference. Returns the remaining count, or `None` for a
    /// stale handle.
    pub fn release(&mut self, handle: PainterHandle) -> Option<u32> {
        let entry = self.entry_mut(handle)?;
        entry.refs = entry.refs.saturating_sub(1);
        Some(entry.refs)
    }

    /// Destroys every unreferenced painter of `display` and frees its colors.
    /// Returns the number destroyed.
    pub fn collect_garbage(&mut self, display: &mut dyn Display) -> usize {
        let id = display.id();
        let mut destroyed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let unused = slot.entry.as_ref().is_some_and(|e| e.refs == 0 && e.key.display == id);
            if !unused {
                continue;
            }
            let Some(mut entry) = slot.entry.take() else { continue };
            entry.painter.destroy(display);
            self.lookup.remove(&entry.key);
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(index as u32);
            destroyed += 1;
        }
        if destroyed > 0 {
            log::debug!("collected {destroyed} unused painter(s) of {id:?}");
        }
        destroyed
    }

    pub fn get(&self, handle: PainterHandle) -> Option<&Painter> {
        self.entry(handle).map(|e| &e.painter)
    }

    pub fn ref_count(&self, handle: PainterHandle) -> Option<u32> {
        self.entry(handle).map(|e| e.refs)
    }

    /// Number of live painters, referenced or not.
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    fn entry(&self, handle: PainterHandle) -> Option<&Entry> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, handle: PainterHandle) -> Option<&mut Entry> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{MemoryDisplay, PainterError, Visual, VisualClass};
    use crate::painter::PainterState;

    const CMAP: ColormapId = ColormapId(3);

    fn indexed() -> (MemoryDisplay, SurfaceDescriptor) {
        let visual = Visual::indexed(VisualId(7), 256, false);
        let mut d = MemoryDisplay::new(DisplayId(1));
        d.add_colormap(CMAP, &visual);
        (d, SurfaceDescriptor::new(DisplayId(1), CMAP, visual, 8))
    }

    // ── acquire / release ─────────────────────────────────────────────────

    #[test]
    fn same_descriptor_shares_one_painter() {
        let (mut d, desc) = indexed();
        let mut cache = PainterCache::default();
        let a = cache.acquire(&mut d, &desc).unwrap();
        let allocated = d.allocated(CMAP);
        let b = cache.acquire(&mut d, &desc).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.ref_count(a), Some(2));
        assert_eq!(d.allocated(CMAP), allocated);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.release(a), Some(1));
        assert_eq!(cache.collect_garbage(&mut d), 0);
        assert_eq!(cache.release(b), Some(0));
        assert!(cache.get(a).is_some());

        assert_eq!(cache.collect_garbage(&mut d), 1);
        assert!(cache.get(a).is_none());
        assert_eq!(cache.release(a), None);
        assert!(cache.is_empty());
        assert_eq!(d.allocated(CMAP), 0);
    }

    #[test]
    fn reacquire_before_collection_revives() {
        let (mut d, desc) = indexed();
        let mut cache = PainterCache::default();
        let a = cache.acquire(&mut d, &desc).unwrap();
        cache.release(a);
        let b = cache.acquire(&mut d, &desc).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.ref_count(b), Some(1));
        assert_eq!(cache.collect_garbage(&mut d), 0);
        assert!(cache.get(b).is_some_and(|p| p.state() == PainterState::Ready));
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let (mut d, desc) = indexed();
        let mut cache = PainterCache::default();
        let old = cache.acquire(&mut d, &desc).unwrap();
        cache.release(old);
        cache.collect_garbage(&mut d);
        let new = cache.acquire(&mut d, &desc).unwrap();
        assert_ne!(old, new);
        assert!(cache.get(old).is_none());
        assert_eq!(cache.ref_count(new), Some(1));
    }

    #[test]
    fn gamma_selects_a_different_painter() {
        let (mut d, desc) = indexed();
        let mut cache = PainterCache::default();
        let plain = cache.acquire(&mut d, &desc).unwrap();
        let corrected = cache.acquire(&mut d, &desc.with_gamma(2.2)).unwrap();
        assert_ne!(plain, corrected);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn collection_is_scoped_to_display() {
        let (mut d, desc) = indexed();
        let mut other = MemoryDisplay::new(DisplayId(9));
        let mut cache = PainterCache::default();
        let h = cache.acquire(&mut d, &desc).unwrap();
        cache.release(h);
        assert_eq!(cache.collect_garbage(&mut other), 0);
        assert_eq!(cache.collect_garbage(&mut d), 1);
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn missing_colors_surface_with_context() {
        let (mut d, desc) = indexed();
        d.limit_allocations(CMAP, 0);
        d.drop_black_white(CMAP);
        let mut cache = PainterCache::default();
        let err = cache.acquire(&mut d, &desc).unwrap_err();
        assert!(err.to_string().contains("failed to create painter"));
        assert!(matches!(err.downcast_ref::<PainterError>(), Some(PainterError::NoColors)));
        assert!(cache.is_empty());
    }

    #[test]
    fn foreign_display_is_rejected() {
        let (_, desc) = indexed();
        let mut other = MemoryDisplay::new(DisplayId(9));
        let mut cache = PainterCache::default();
        assert!(cache.acquire(&mut other, &desc).is_err());
    }

    #[test]
    fn monochrome_init_applies_to_every_painter() {
        let (mut d, desc) = indexed();
        let init = PainterInit { force_monochrome: true, ..PainterInit::default() };
        let mut cache = PainterCache::new(init);
        let h = cache.acquire(&mut d, &desc).unwrap();
        let painter = cache.get(h).unwrap();
        assert!(painter.quantizer().is_monochrome());
        assert_eq!(painter.descriptor().visual.class, VisualClass::Indexed { grayscale: false });
    }
}
