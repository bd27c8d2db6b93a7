mod support;

use blockreel::{ContainerStore, Frame, FrameContainer, ReelError, content_id};
use proptest::prelude::*;
use support::frame_from;

fn sample_frames() -> Vec<Frame> {
    vec![
        frame_from(3, &[1, 2, 3, 4, 5, 6]),
        frame_from(3, &[15, 0, 15, 0, 15, 0]),
        frame_from(3, &[7; 6]),
    ]
}

#[test]
fn save_then_load_roundtrips_frames() {
    let dir = tempfile::tempdir().unwrap();
    let store = ContainerStore::new(dir.path());
    let id = content_id(b"clip");

    let container = FrameContainer::build(id.clone(), sample_frames()).unwrap();
    let path = container.save(&store).unwrap();
    assert_eq!(path, dir.path().join(format!("3x2-{id}.afc")));
    // 3x2 packs into ceil(6/2) = 3 bytes per frame, no header.
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 9);

    let loaded = store.load(3, 2, &id).unwrap().unwrap();
    assert_eq!(loaded.identifier(), id);
    assert_eq!(loaded.frames(), sample_frames().as_slice());
}

#[test]
fn odd_pixel_count_pads_with_black() {
    let dir = tempfile::tempdir().unwrap();
    let store = ContainerStore::new(dir.path());
    let frame = frame_from(3, &[9, 10, 11]);
    let path = FrameContainer::build("odd", vec![frame.clone()])
        .unwrap()
        .save(&store)
        .unwrap();

    assert_eq!(std::fs::read(path).unwrap(), vec![0x9a, 0xb0]);
    assert_eq!(store.load(3, 1, "odd").unwrap().unwrap().frames(), &[frame]);
}

#[test]
fn missing_container_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = ContainerStore::new(dir.path());
    assert!(store.load(3, 2, "absent").unwrap().is_none());
    assert!(!store.exists(3, 2, "absent"));
}

#[test]
fn partial_trailing_frame_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let store = ContainerStore::new(dir.path());
    let path = FrameContainer::build("tail", sample_frames())
        .unwrap()
        .save(&store)
        .unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 1);
    std::fs::write(&path, bytes).unwrap();

    let loaded = store.load(3, 2, "tail").unwrap().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.frames(), &sample_frames()[..2]);
}

#[test]
fn file_shorter_than_one_frame_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let store = ContainerStore::new(dir.path());
    std::fs::write(store.path_for(3, 2, "short"), [0x12, 0x34]).unwrap();
    std::fs::write(store.path_for(3, 2, "empty"), b"").unwrap();

    for id in ["short", "empty"] {
        let err = store.load(3, 2, id).unwrap_err();
        assert!(matches!(err, ReelError::CorruptContainer { .. }), "{err}");
    }
}

#[test]
fn resolution_is_part_of_the_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = ContainerStore::new(dir.path());
    FrameContainer::build("clip", sample_frames())
        .unwrap()
        .save(&store)
        .unwrap();

    assert!(store.exists(3, 2, "clip"));
    assert!(!store.exists(2, 3, "clip"));
    assert!(store.load(6, 1, "clip").unwrap().is_none());
}

#[test]
fn saving_again_replaces_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = ContainerStore::new(dir.path());
    FrameContainer::build("clip", sample_frames())
        .unwrap()
        .save(&store)
        .unwrap();
    FrameContainer::build("clip", vec![frame_from(3, &[4; 6])])
        .unwrap()
        .save(&store)
        .unwrap();

    let loaded = store.load(3, 2, "clip").unwrap().unwrap();
    assert_eq!(loaded.frames(), &[frame_from(3, &[4; 6])]);
    // No temp files left behind next to the container.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn empty_sequences_are_rejected() {
    let err = FrameContainer::build("none", Vec::new()).unwrap_err();
    assert!(matches!(err, ReelError::EmptySequence));
}

fn sequence() -> impl Strategy<Value = (u32, Vec<Frame>)> {
    (1u32..10, 1u32..6, 1usize..6).prop_flat_map(|(w, h, n)| {
        prop::collection::vec(prop::collection::vec(0u8..16, (w * h) as usize), n).prop_map(
            move |frames| (w, frames.iter().map(|ix| frame_from(w, ix)).collect::<Vec<_>>()),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn saved_sequences_load_back_unchanged((w, frames) in sequence()) {
        let dir = tempfile::tempdir().unwrap();
        let store = ContainerStore::new(dir.path());
        let h = frames[0].height();
        FrameContainer::build("seq", frames.clone())
            .unwrap()
            .save(&store)
            .unwrap();

        let loaded = store.load(w, h, "seq").unwrap().unwrap();
        prop_assert_eq!(loaded.frames(), frames.as_slice());
    }

    #[test]
    fn partial_tail_of_any_length_is_dropped(
        (w, frames) in sequence(),
        cut in any::<prop::sample::Index>(),
    ) {
        let h = frames[0].height();
        let frame_size = Frame::packed_len(w, h);
        prop_assume!(frame_size > 1);
        let tail = 1 + cut.index(frame_size - 1);

        let dir = tempfile::tempdir().unwrap();
        let store = ContainerStore::new(dir.path());
        let path = FrameContainer::build("seq", frames.clone())
            .unwrap()
            .save(&store)
            .unwrap();
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.extend(vec![0xab; tail]);
        std::fs::write(&path, bytes).unwrap();

        let loaded = store.load(w, h, "seq").unwrap().unwrap();
        prop_assert_eq!(loaded.frames(), frames.as_slice());
    }
}
