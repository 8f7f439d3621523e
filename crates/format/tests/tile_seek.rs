use tileshot_common::{TileCoord, WorldSize};
use tileshot_format::fixture::{RecordSpec, WorldFixture};
use tileshot_format::{Error, TileRecords, TileSeekCursor, World};

/// A 6x5 world mixing every record shape, covering exactly 30 tiles.
fn mixed_fixture() -> WorldFixture {
    let mut extra = vec![false; 260];
    extra[5] = true;
    extra[259] = true;
    WorldFixture::new(6, 5).tile_extra(extra).records([
        RecordSpec::empty(4),
        RecordSpec {
            tile_type: Some(5),
            frame: true,
            wall: Some(2),
            ..RecordSpec::default()
        },
        RecordSpec::tile(1, 2),
        RecordSpec {
            tile_type: Some(259),
            frame: true,
            tile_color: Some(3),
            run_length: 6,
            ..RecordSpec::default()
        },
        RecordSpec {
            wall: Some(9),
            wall_color: Some(1),
            liquid: Some(255),
            ..RecordSpec::default()
        },
        RecordSpec::empty(0),
        RecordSpec::empty(11),
    ])
}

#[test]
fn two_by_two_scenario() {
    let bytes = WorldFixture::new(2, 2)
        .record(RecordSpec::empty(1))
        .record(RecordSpec::empty(1))
        .build();
    let world = World::from_bytes(bytes).unwrap();
    assert_eq!(world.sections().len(), 2);
    assert_eq!(world.tile_type_count(), 1);

    let a = TileSeekCursor::locate(&world, 0).unwrap().file_offset();
    let offsets: Vec<usize> = (0..4)
        .map(|i| TileSeekCursor::locate(&world, i).unwrap().file_offset())
        .collect();
    assert_eq!(offsets, vec![a, a, a + 2, a + 2]);
    assert!(TileSeekCursor::locate(&world, 4).is_err());
}

#[test]
fn sections_after_the_grid_are_not_tiles() {
    let fixture = mixed_fixture()
        .extra_sections(3)
        .trailer(&[0x80, 0xff, 0x7f, 0x00, 0x00, 0x40, 0x09]);
    let world = World::from_bytes(fixture.build()).unwrap();
    assert_eq!(world.sections().len(), 5);
    let total = world.world_size().unwrap().tile_count();

    assert!(TileSeekCursor::locate(&world, total - 1).is_ok());
    for target in [total, total + 1, total + 40_000] {
        assert!(
            matches!(
                TileSeekCursor::locate(&world, target),
                Err(Error::TruncatedInput { .. })
            ),
            "target {target}"
        );
    }

    let mut cursor = TileSeekCursor::locate(&world, total - 1).unwrap();
    let before = cursor.position();
    assert!(cursor.advance().is_err());
    assert_eq!(cursor.position(), before);

    let covered: u64 = TileRecords::new(&world)
        .unwrap()
        .map_while(|item| item.ok())
        .map(|(_, record)| record.covers())
        .sum();
    assert_eq!(covered, total);
}

#[test]
fn locate_then_advance_equals_locate() {
    let world = World::from_bytes(mixed_fixture().build()).unwrap();
    let total = world.world_size().unwrap().tile_count();
    for start in 0..total {
        let mut cursor = TileSeekCursor::locate(&world, start).unwrap();
        for k in 0..(total - start) {
            let direct = TileSeekCursor::locate(&world, start + k).unwrap();
            assert_eq!(cursor.position(), direct.position(), "start {start} k {k}");
            if start + k + 1 < total {
                cursor.advance().unwrap();
            }
        }
    }
}

#[test]
fn skip_equals_locate() {
    let world = World::from_bytes(mixed_fixture().build()).unwrap();
    let total = world.world_size().unwrap().tile_count();
    for start in 0..total {
        for n in 0..(total - start) {
            let mut cursor = TileSeekCursor::locate(&world, start).unwrap();
            cursor.skip(n).unwrap();
            let direct = TileSeekCursor::locate(&world, start + n).unwrap();
            assert_eq!(cursor.position(), direct.position());
        }
    }
}

#[test]
fn records_cover_grid_exactly() {
    let world = World::from_bytes(mixed_fixture().build()).unwrap();
    let expected = world.world_size().unwrap().tile_count();
    let mut covered = 0u64;
    for item in TileRecords::new(&world).unwrap() {
        let (_, record) = item.unwrap();
        covered += record.covers();
        if covered >= expected {
            break;
        }
    }
    assert_eq!(covered, expected);
}

#[test]
fn every_truncated_prefix_fails_cleanly() {
    let fixture = mixed_fixture();
    let bytes = fixture.build();
    let size = WorldSize::new(6, 5);
    let last = size.index_of(TileCoord::new(5, 4)).unwrap();

    let full = World::from_bytes(bytes.clone()).unwrap();
    assert!(TileSeekCursor::locate(&full, last).is_ok());

    for len in 0..bytes.len() {
        let prefix = bytes[..len].to_vec();
        let result = World::from_bytes(prefix).and_then(|world| {
            world.world_size()?;
            TileSeekCursor::locate(&world, last).map(|_| ())
        });
        assert!(
            matches!(result, Err(Error::TruncatedInput { .. })),
            "prefix of {len} bytes gave {result:?}"
        );
    }
}

#[test]
fn capture_rectangle_walk() {
    // Walk column 2, rows 1..4 of the mixed world by locate + advance.
    let world = World::from_bytes(mixed_fixture().build()).unwrap();
    let size = world.world_size().unwrap();
    let top = size.index_of(TileCoord::new(2, 1)).unwrap();
    let mut cursor = TileSeekCursor::locate(&world, top).unwrap();
    for row in 1..4 {
        let index = size.index_of(TileCoord::new(2, row)).unwrap();
        assert_eq!(cursor.index(), index);
        assert_eq!(
            cursor.position(),
            TileSeekCursor::locate(&world, index).unwrap().position()
        );
        cursor.advance().unwrap();
    }
}

#[test]
fn cursors_share_a_world_across_threads() {
    let world = World::from_bytes(mixed_fixture().build()).unwrap();
    let total = world.world_size().unwrap().tile_count();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let world = &world;
                s.spawn(move || {
                    let mut cursor = TileSeekCursor::locate(world, t).unwrap();
                    while cursor.index() + 1 < total {
                        cursor.advance().unwrap();
                    }
                    cursor.position()
                })
            })
            .collect();
        let ends: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ends.windows(2).all(|w| w[0] == w[1]));
    });
}

#[test]
fn open_fixture_from_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("mixed.wld");
    std::fs::write(&path, mixed_fixture().build()).unwrap();
    let world = World::open(&path).unwrap();
    let info = world.info().unwrap();
    assert_eq!(info.title, "fixture");
    assert_eq!(info.size, WorldSize::new(6, 5));
    assert!(TileSeekCursor::locate(&world, 29).is_ok());
}
