//! Property-based tests for the playback controller
//!
//! Uses proptest to verify invariants across many random inputs.
//! No shallow tests - every property test verifies meaningful invariants.

use aria_core::{PlaybackSource, Track};
use aria_playback::{
    ChannelOutput, FailureReason, PlaybackConfig, PlaybackController, PlaybackState, RepeatMode,
    ShuffleQueue,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

// ===== Helpers =====

fn arbitrary_track(index: usize) -> impl Strategy<Value = Track> {
    (
        "[A-Za-z ]{1,30}",                       // title
        "[A-Za-z ]{1,20}",                       // artist
        proptest::option::of(1u64..600),         // duration (1-600 seconds)
    )
        .prop_map(move |(title, artist, duration)| {
            let track = Track::new(index as i64, title, format!("/audio/{index}.mp3"))
                .with_artist(artist);
            match duration {
                Some(secs) => track.with_duration(Duration::from_secs(secs)),
                None => track,
            }
        })
}

fn arbitrary_tracks() -> impl Strategy<Value = Vec<Track>> {
    (1usize..40).prop_flat_map(|len| (0..len).map(arbitrary_track).collect::<Vec<_>>())
}

fn controller_with(tracks: Vec<Track>, seed: u64) -> PlaybackController<ChannelOutput> {
    let (output, _rx) = ChannelOutput::new();
    let config = PlaybackConfig {
        shuffle_seed: Some(seed),
        ..Default::default()
    };
    let mut controller = PlaybackController::new(output, config);
    controller.set_tracks(PlaybackSource::All, tracks);
    controller
}

/// Drive a random user operation
fn apply(controller: &mut PlaybackController<ChannelOutput>, op: u8, arg: usize) {
    match op {
        0 => controller.play_next(),
        1 => controller.play_previous(),
        2 => controller.toggle_shuffle(),
        3 => controller.toggle_repeat(),
        4 => controller.load_track(arg, arg % 2 == 0),
        5 => controller.play(),
        6 => controller.pause(),
        7 => {
            if let Some(ticket) = controller.load_ticket() {
                controller.on_source_ready(ticket, None);
            }
        }
        8 => {
            if let Some(ticket) = controller.pending_play_ticket() {
                let result = if arg % 3 == 0 {
                    Err(FailureReason::AutoplayBlocked)
                } else {
                    Ok(())
                };
                controller.settle_play(ticket, result);
            }
        }
        _ => {
            if let Some(ticket) = controller.load_ticket() {
                controller.on_track_ended(ticket);
            }
        }
    }
}

// ===== Property Tests =====

proptest! {
    /// Property: sequential next always lands on (i + 1) mod n
    #[test]
    fn sequential_next_wraps_modulo_length(
        tracks in arbitrary_tracks(),
        start in 0usize..40,
    ) {
        let len = tracks.len();
        let start = start % len;
        let mut controller = controller_with(tracks, 1);
        controller.load_track(start, false);

        controller.play_next();

        prop_assert_eq!(controller.current_index(), (start + 1) % len);
    }

    /// Property: enabling shuffle pins the current index first in a full permutation
    #[test]
    fn shuffle_queue_pins_current_index(
        tracks in arbitrary_tracks(),
        start in 0usize..40,
        seed in any::<u64>(),
    ) {
        let len = tracks.len();
        let start = start % len;
        let mut controller = controller_with(tracks, seed);
        controller.load_track(start, true);

        controller.toggle_shuffle();

        let queue = controller.shuffle_queue();
        prop_assert_eq!(queue[0], start);
        prop_assert_eq!(queue.len(), len);
        let mut sorted = queue.to_vec();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..len).collect::<Vec<_>>());
        prop_assert_eq!(controller.current_index(), start);
    }

    /// Property: shuffle never repeats a track before the queue is exhausted
    #[test]
    fn shuffle_visits_every_track_once_per_cycle(
        tracks in arbitrary_tracks(),
        seed in any::<u64>(),
    ) {
        let len = tracks.len();
        let mut controller = controller_with(tracks, seed);
        controller.load_track(0, false);
        controller.toggle_shuffle();

        let mut visited = vec![controller.current_index()];
        for _ in 1..len {
            controller.play_next();
            visited.push(controller.current_index());
        }

        visited.sort_unstable();
        prop_assert_eq!(visited, (0..len).collect::<Vec<_>>());
    }

    /// Property: shuffle on implies repeat none after any operation sequence
    #[test]
    fn shuffle_and_repeat_are_exclusive(
        tracks in arbitrary_tracks(),
        operations in prop::collection::vec((0u8..10, 0usize..40), 1..60),
    ) {
        let mut controller = controller_with(tracks, 3);

        for (op, arg) in operations {
            apply(&mut controller, op, arg);

            if controller.shuffle() {
                prop_assert_eq!(controller.repeat(), RepeatMode::None);
            }
            prop_assert!(controller.current_index() < controller.active_tracks().len());
        }
    }

    /// Property: the shuffle queue stays a permutation of the active list
    #[test]
    fn shuffle_queue_stays_a_permutation(
        tracks in arbitrary_tracks(),
        operations in prop::collection::vec((0u8..10, 0usize..40), 1..60),
    ) {
        let len = tracks.len();
        let mut controller = controller_with(tracks, 5);

        for (op, arg) in operations {
            apply(&mut controller, op, arg);

            if controller.shuffle() {
                let queue = ShuffleQueue::from_order(controller.shuffle_queue().to_vec(), len);
                prop_assert!(queue.is_some(), "queue is not a permutation");
            } else {
                prop_assert!(controller.shuffle_queue().is_empty());
            }
        }
    }

    /// Property: volume always lands in [0, 1]
    #[test]
    fn volume_is_always_clamped(levels in prop::collection::vec(any::<f32>(), 1..30)) {
        let mut controller = controller_with(Vec::new(), 1);

        for level in levels {
            controller.set_volume(level);
            let volume = controller.volume();
            prop_assert!((0.0..=1.0).contains(&volume), "volume out of range: {}", volume);
        }
    }

    /// Property: settling a superseded play request never changes state
    #[test]
    fn stale_settlement_is_ignored(
        tracks in arbitrary_tracks(),
        next in 0usize..40,
        reject in any::<bool>(),
    ) {
        let len = tracks.len();
        let mut controller = controller_with(tracks, 1);
        controller.load_track(0, true);
        let load = controller.load_ticket().unwrap();
        controller.on_source_ready(load, None);
        let stale = controller.pending_play_ticket().unwrap();

        // Superseded by a newer load (or a pause for single-track lists)
        if len > 1 {
            controller.load_track(1 + next % (len - 1), false);
        } else {
            controller.pause();
        }
        let state = controller.state();
        let index = controller.current_index();

        let result = if reject { Err(FailureReason::Aborted) } else { Ok(()) };
        controller.settle_play(stale, result);

        prop_assert_eq!(controller.state(), state);
        prop_assert_eq!(controller.current_index(), index);
        prop_assert_eq!(controller.last_failure(), None);
    }

    /// Property: seek never moves past the track duration
    #[test]
    fn seek_is_clamped(
        tracks in arbitrary_tracks(),
        secs in -1000.0f64..10_000.0,
    ) {
        let mut controller = controller_with(tracks, 1);
        controller.load_track(0, false);
        let load = controller.load_ticket().unwrap();
        controller.on_source_ready(load, None);

        controller.seek_secs(secs);

        prop_assert!(controller.position() <= controller.duration());
        prop_assert_eq!(controller.state(), PlaybackState::Paused);
    }

    /// Property: regeneration always yields a permutation with the pinned index first
    #[test]
    fn regenerate_is_a_pinned_permutation(len in 1usize..200, pinned in 0usize..200, seed in any::<u64>()) {
        let pinned = pinned % len;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut queue = ShuffleQueue::new();

        queue.regenerate(len, pinned, &mut rng);

        prop_assert!(queue.is_permutation_of(len));
        prop_assert_eq!(queue.first(), Some(pinned));
    }
}
