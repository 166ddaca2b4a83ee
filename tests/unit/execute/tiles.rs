use super::*;

#[test]
fn tiles_cover_area_exactly_once() {
    let area = Rect::new(-3, 70, 5, 40).unwrap();
    let tiles = split_tiles(area, 16);
    assert_eq!(tiles.iter().map(|t| t.area()).sum::<usize>(), area.area());
    for (i, a) in tiles.iter().enumerate() {
        assert!(a.intersect(area) == Some(*a));
        for b in &tiles[i + 1..] {
            assert!(a.intersect(*b).is_none(), "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn edge_tiles_are_clipped() {
    let tiles = split_tiles(Rect::from_size(10, 5), 4);
    assert_eq!(tiles.len(), 3 * 2);
    assert_eq!(tiles[2], Rect::new(8, 10, 0, 4).unwrap());
    assert_eq!(tiles[5], Rect::new(8, 10, 4, 5).unwrap());
}

#[test]
fn degenerate_inputs() {
    assert!(split_tiles(Rect::default(), 8).is_empty());
    assert_eq!(split_tiles(Rect::from_size(2, 1), 0).len(), 2);
    assert_eq!(split_tiles(Rect::from_size(3, 3), 64), vec![Rect::from_size(3, 3)]);
}
