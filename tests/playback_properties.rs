//! Property tests for frame playback and boundary travel.

use image::RgbaImage;
use proptest::prelude::*;

use battlefx::components::animation::AnimatedSprite;
use battlefx::components::motion::{Direction, Motion, Side};
use battlefx::resources::framesource::SheetGeometry;
use battlefx::resources::texturestore::Texture;

fn frames(n: usize) -> Vec<Texture> {
    (0..n)
        .map(|i| Texture::from_image(format!("/p/{i}.png"), RgbaImage::new(1, 1)))
        .collect()
}

/// Speeds that accumulate without rounding error.
fn exact_speed() -> impl Strategy<Value = f32> {
    prop_oneof![Just(0.25f32), Just(0.5), Just(1.0), Just(2.0)]
}

proptest! {
    #[test]
    fn non_looping_completes_once_on_the_last_frame(n in 2usize..40, speed in exact_speed()) {
        let mut anim = AnimatedSprite::new(frames(n)).with_speed(speed);
        anim.play(0);

        let expected = ((n - 1) as f32 / speed).ceil() as usize;
        let mut completions = Vec::new();
        for tick in 1..=expected + 10 {
            if anim.advance(1.0) {
                completions.push(tick);
            }
            prop_assert!(anim.current_frame() < n);
        }

        prop_assert_eq!(completions, vec![expected]);
        prop_assert_eq!(anim.current_frame(), n - 1);
    }

    #[test]
    fn looping_wraps_and_never_completes(n in 1usize..20, ticks in 0usize..200) {
        let mut anim = AnimatedSprite::new(frames(n)).with_loop(true);
        anim.play(0);

        for _ in 0..ticks {
            prop_assert!(!anim.advance(1.0));
        }

        prop_assert_eq!(anim.current_frame(), ticks % n);
        prop_assert!(anim.is_playing());
    }

    #[test]
    fn boundary_is_hit_once_on_the_predicted_tick(
        start in 0u32..500,
        distance in 1u32..1000,
        step in 1u32..20,
        reverse in any::<bool>(),
    ) {
        let start = start as f32;
        let (direction, boundary) = if reverse {
            (Direction::RightToLeft, start - distance as f32)
        } else {
            (Direction::LeftToRight, start + distance as f32)
        };
        let mut motion = Motion::new(direction, step as f32, boundary, boundary);
        motion.start();

        let expected = distance.div_ceil(step);
        let mut x = start;
        let mut hits = Vec::new();
        for tick in 1..=expected + 5 {
            x += motion.velocity();
            if let Some(side) = motion.check_crossing(x) {
                hits.push((tick, side));
            }
        }

        prop_assert_eq!(hits, vec![(expected, direction.target_side())]);
    }

    #[test]
    fn single_row_frames_tile_the_sheet(w in 1u32..128, h in 1u32..128, count in 1u32..16) {
        let geometry = SheetGeometry::new(w, h, count);
        for i in 0..count {
            let rect = geometry.frame_rect(i);
            prop_assert_eq!((rect.x, rect.y, rect.width, rect.height), (i * w, 0, w, h));
        }
    }
}

#[test]
fn restart_after_boundary_fires_again() {
    let mut motion = Motion::new(Direction::LeftToRight, 10.0, 0.0, 50.0);
    motion.start();
    assert_eq!(motion.check_crossing(60.0), Some(Side::Right));
    assert_eq!(motion.check_crossing(70.0), None);
    motion.start();
    assert_eq!(motion.check_crossing(60.0), Some(Side::Right));
}
