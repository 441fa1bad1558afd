//! Property-based tests for playlist selection, end-of-track policy and
//! background vibration

mod common;

use common::{FakeBackend, Harness};
use egui::Vec2;
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use spectrum_visualizer::render::vibration_offset;
use spectrum_visualizer::{
    next_after_end, EndedAction, PlaybackSettings, Playlist, ResourceHandle, ResourceReleaser,
    Track,
};

struct Discard;

impl ResourceReleaser for Discard {
    fn release(&self, _handle: ResourceHandle) {}
}

#[derive(Clone, Debug)]
enum Op {
    Add,
    Remove(usize),
    Move(usize, usize),
    Select(usize),
    ClearSelection,
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Add),
        (0usize..12).prop_map(Op::Remove),
        (0usize..12, 0usize..12).prop_map(|(from, to)| Op::Move(from, to)),
        (0usize..12).prop_map(Op::Select),
        Just(Op::ClearSelection),
    ]
}

fn arbitrary_settings() -> impl Strategy<Value = PlaybackSettings> {
    prop::collection::vec(0u8..3, 0..6).prop_map(|toggles| {
        toggles.into_iter().fold(PlaybackSettings::default(), |s, t| match t {
            0 => s.toggle_loop_track(),
            1 => s.toggle_loop_playlist(),
            _ => s.toggle_vibration(),
        })
    })
}

proptest! {
    /// Property: the offset never leaves the circle of radius `max`
    #[test]
    fn vibration_is_bounded(
        average in -1.0f32..2.0,
        max in 0.0f32..100.0,
        seed in any::<u64>(),
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        for _ in 0..16 {
            let offset = vibration_offset(average, max, &mut rng);
            prop_assert!(offset.length() <= max + 1e-3, "{offset:?} exceeds {max}");
        }
    }

    /// Property: silence never moves the background
    #[test]
    fn silence_does_not_vibrate(max in 0.0f32..100.0, seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        prop_assert_eq!(vibration_offset(0.0, max, &mut rng), Vec2::ZERO);
    }

    /// Property: rendered frames respect the configured displacement, and
    /// leave the background centered while vibration is off
    #[test]
    fn frame_offsets_follow_settings(level in any::<u8>(), vibration in any::<bool>(), frames in 1usize..20) {
        let mut h = Harness::with_backend(FakeBackend::with_level(level));
        h.upload("a");
        h.element_started();
        if vibration {
            h.controller.toggle_vibration();
        }

        for _ in 0..frames {
            h.frame();
            let offset = h.controller.render_loop().offset();
            if vibration {
                prop_assert!(offset.length() <= h.config.max_vibration + 1e-3);
            } else {
                prop_assert_eq!(offset, Vec2::ZERO);
            }
        }
    }

    /// Property: the selection is either empty or points at a track, and keeps
    /// pointing at the same track until that track is removed
    #[test]
    fn selection_survives_edits(ops in prop::collection::vec(arbitrary_op(), 1..60)) {
        let mut playlist = Playlist::new(Box::new(Discard));
        let mut names = 0u32;

        for op in ops {
            let before = playlist.selected().map(Track::id);
            let mut removed = None;
            match op {
                Op::Add => {
                    names += 1;
                    playlist.add(format!("t{names}"), ResourceHandle::new(format!("blob:{names}")));
                }
                Op::Remove(i) => {
                    if let Some(id) = playlist.get(i).map(Track::id) {
                        removed = Some(id);
                        playlist.remove(id, false);
                    }
                }
                Op::Move(from, to) => {
                    playlist.move_track(from, to);
                }
                Op::Select(i) => {
                    let expected = i < playlist.len();
                    prop_assert_eq!(playlist.select(i), expected);
                    continue;
                }
                Op::ClearSelection => {
                    playlist.clear_selection();
                    continue;
                }
            }

            if let Some(idx) = playlist.selected_index() {
                prop_assert!(idx < playlist.len());
            }
            let after = playlist.selected().map(Track::id);
            if before.is_some() && before == removed {
                prop_assert_eq!(after, None);
            } else {
                prop_assert_eq!(after, before);
            }
        }
    }

    /// Property: loop track beats loop playlist beats advancing, and every
    /// chosen index is in range
    #[test]
    fn end_of_track_precedence(
        settings in arbitrary_settings(),
        len in 0usize..10,
        selected in proptest::option::of(0usize..10),
    ) {
        prop_assert!(!(settings.loop_track() && settings.loop_playlist()));
        let selected = selected.filter(|&i| i < len);

        match next_after_end(settings, selected, len) {
            EndedAction::Restart(i) => {
                prop_assert!(settings.loop_track());
                prop_assert_eq!(Some(i), selected);
            }
            EndedAction::Advance(i) => {
                prop_assert!(i < len);
                if settings.loop_playlist() {
                    prop_assert_eq!(i, selected.map_or(0, |s| (s + 1) % len));
                } else {
                    prop_assert_eq!(Some(i), selected.map(|s| s + 1));
                }
            }
            EndedAction::Stop => {
                prop_assert!(!settings.loop_playlist() || len == 0);
                prop_assert!(selected.is_none_or(|s| s + 1 >= len));
            }
        }
    }

    /// Property: selecting any valid index loads exactly that track
    #[test]
    fn select_loads_requested_track(len in 1usize..8, pick in 0usize..8) {
        let mut h = Harness::new();
        for n in 0..len {
            h.upload(&format!("track{n}"));
        }
        let pick = pick % len;

        h.controller.select_track(pick);

        prop_assert_eq!(h.controller.selected_index(), Some(pick));
        prop_assert_eq!(h.media.source(), Some(format!("blob:track{pick}")));
    }
}
