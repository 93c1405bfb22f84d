use super::{Sprite, SpriteId};
use crate::math2d::Vector2f;
use crate::pixel_buffer::PixelBuffer;

/// Append-only arena of sprites. A sprite's id is its insertion index.
#[derive(Debug, Default)]
pub struct SpriteStore {
    sprites: Vec<Sprite>,
}

impl SpriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter()
    }

    /// Wrap a sheet as a new sprite
    pub fn add(
        &mut self,
        name: impl Into<String>,
        canvas: PixelBuffer,
        h_count: u32,
        v_count: u32,
    ) -> SpriteId {
        let id = SpriteId(self.sprites.len());
        let sprite = Sprite::new(id, name, canvas, h_count, v_count);
        log::info!(
            "sprite {} '{}': {} frames of {}x{}",
            id,
            sprite.name(),
            sprite.total_frames(),
            sprite.frame_width(),
            sprite.frame_height()
        );
        self.sprites.push(sprite);
        id
    }

    /// Panics on an id this store never issued
    #[inline]
    pub fn get(&self, id: SpriteId) -> &Sprite {
        assert!(
            id.0 < self.sprites.len(),
            "sprite id {} out of range ({} sprites loaded)",
            id,
            self.sprites.len()
        );
        &self.sprites[id.0]
    }

    #[inline]
    pub fn get_mut(&mut self, id: SpriteId) -> &mut Sprite {
        assert!(
            id.0 < self.sprites.len(),
            "sprite id {} out of range ({} sprites loaded)",
            id,
            self.sprites.len()
        );
        &mut self.sprites[id.0]
    }

    /// First sprite whose name contains `name`
    pub fn find(&self, name: &str) -> Option<SpriteId> {
        self.sprites
            .iter()
            .find(|s| s.name().contains(name))
            .map(Sprite::id)
    }

    /// Premultiply if needed and hand back the sprite for drawing
    pub(crate) fn prepare(&mut self, id: SpriteId) -> &Sprite {
        let sprite = self.get_mut(id);
        sprite.ensure_premultiplied();
        sprite
    }

    /// Replace the sheet of the first sprite matching `name`
    pub fn replace(
        &mut self,
        name: &str,
        canvas: PixelBuffer,
        h_count: u32,
        v_count: u32,
    ) -> Option<SpriteId> {
        let id = self.find(name)?;
        self.get_mut(id).set_canvas(canvas, h_count, v_count);
        log::debug!("sprite {} '{}': canvas replaced", id, name);
        Some(id)
    }

    /// Force the premultiplied copy of the first sprite matching `name` to rebuild
    pub fn refresh(&mut self, name: &str) -> Option<SpriteId> {
        let id = self.find(name)?;
        self.get_mut(id).mark_dirty();
        Some(id)
    }

    /// Set the origin of every sprite whose name contains `root_name`.
    /// Returns how many sprites matched.
    pub fn set_origins(&mut self, root_name: &str, origin: Vector2f, relative: bool) -> usize {
        let mut matched = 0;
        for sprite in self.sprites.iter_mut().filter(|s| s.name().contains(root_name)) {
            sprite.set_origin(origin, relative);
            matched += 1;
        }
        matched
    }

    pub fn centre_all_origins(&mut self) {
        self.sprites.iter_mut().for_each(Sprite::centre_origin);
    }

    pub fn flip_all_origins_vertically(&mut self) {
        self.sprites
            .iter_mut()
            .for_each(Sprite::flip_origin_vertically);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::PremultState;

    fn store_with(names: &[&str]) -> SpriteStore {
        let mut store = SpriteStore::new();
        for name in names {
            store.add(*name, PixelBuffer::new(8, 8), 1, 1);
        }
        store
    }

    #[test]
    fn test_ids_are_insertion_order() {
        let store = store_with(&["a", "b", "c"]);
        let ids: Vec<_> = store.iter().map(|s| s.id().index()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_find_first_substring_match() {
        let store = store_with(&["player_run_4", "player_jump_2", "enemy"]);
        assert_eq!(store.find("player"), Some(SpriteId(0)));
        assert_eq!(store.find("jump"), Some(SpriteId(1)));
        assert_eq!(store.find("boss"), None);
    }

    #[test]
    fn test_replace_keeps_id_and_position() {
        let mut store = store_with(&["a", "b"]);
        let id = store.replace("b", PixelBuffer::new(32, 8), 4, 1);
        assert_eq!(id, Some(SpriteId(1)));
        assert_eq!(store.len(), 2);
        let b = store.get(SpriteId(1));
        assert_eq!(b.total_frames(), 4);
        assert_eq!(b.frame_width(), 8);
        assert_eq!(store.replace("zzz", PixelBuffer::new(1, 1), 1, 1), None);
    }

    #[test]
    fn test_refresh_marks_dirty() {
        let mut store = store_with(&["a"]);
        store.prepare(SpriteId(0));
        assert_eq!(store.get(SpriteId(0)).premult_state(), PremultState::Clean);
        assert_eq!(store.refresh("a"), Some(SpriteId(0)));
        assert_eq!(store.get(SpriteId(0)).premult_state(), PremultState::Dirty);
        assert_eq!(store.refresh("nope"), None);
    }

    #[test]
    fn test_set_origins_by_root_name() {
        let mut store = store_with(&["coin_spin", "coin_glow", "key"]);
        let matched = store.set_origins("coin", Vector2f::new(2.0, 3.0), false);
        assert_eq!(matched, 2);
        assert_eq!(store.get(SpriteId(1)).origin(), Vector2f::new(2.0, 3.0));
        assert_eq!(store.get(SpriteId(2)).origin(), Vector2f::zero());

        store.centre_all_origins();
        assert!(store.iter().all(|s| s.origin() == Vector2f::new(4.0, 4.0)));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_unknown_id_panics() {
        let store = store_with(&["a"]);
        let _ = store.get(SpriteId(7));
    }
}
