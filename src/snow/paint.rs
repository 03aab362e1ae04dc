use crate::snow::atlas::SpriteAtlas;
use crate::snow::field::ParticleField;
use crate::snow::surface::PixelSurface;

/// Clear the surface and stamp every flake with its layer's sprite, scaled to
/// `2 * base_size` and centred on the wobbled position.
pub fn render(surface: &mut PixelSurface, field: &ParticleField, atlas: &SpriteAtlas) {
    surface.clear();
    for i in 0..field.len() {
        let Some(sprite) = atlas.get(field.layer[i] as usize) else {
            continue;
        };
        let (cx, cy) = field.render_pos(i);
        let size = field.base_size[i];
        surface.draw_image(sprite, cx - size, cy - size, size * 2.0, size * 2.0);
    }
}
