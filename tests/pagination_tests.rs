use lessonpay::blog::pagination::{
    ITEMS_PER_PAGE, LinkKind, NEXT_LABEL, PREVIOUS_LABEL, Paginator, total_pages,
};

#[test]
fn test_total_pages_rounds_up() {
    assert_eq!(total_pages(22, 8), 3);
    assert_eq!(total_pages(16, 8), 2);
    assert_eq!(total_pages(7, 8), 1);
    assert_eq!(total_pages(0, 8), 0);
    assert_eq!(total_pages(5, 0), 0);
    assert_eq!(Paginator::new(22).total_pages(), 3);
    assert_eq!(Paginator::new(22).items_per_page(), ITEMS_PER_PAGE);
}

#[test]
fn test_go_to_ignores_out_of_range_pages() {
    let mut p = Paginator::new(22);
    assert!(!p.go_to(0));
    assert!(!p.go_to(4));
    assert_eq!(p.current_page(), 1);
    assert!(p.go_to(3));
    assert_eq!(p.current_page(), 3);
}

#[test]
fn test_page_window_is_centred() {
    let mut p = Paginator::new(20 * 8);
    p.go_to(10);
    assert_eq!(p.page_window(), 8..=12);
}

#[test]
fn test_page_window_near_the_edges() {
    let mut p = Paginator::new(10 * 8);
    assert_eq!(p.page_window(), 1..=5);

    p.go_to(9);
    assert_eq!(p.page_window(), 6..=10);

    p.go_to(10);
    assert_eq!(p.page_window(), 6..=10);

    let short = Paginator::new(3 * 8);
    assert_eq!(short.page_window(), 1..=3);
}

#[test]
fn test_links_layout() {
    let mut p = Paginator::new(22);
    let first = p.links();
    let labels: Vec<&str> = first.iter().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, vec!["1", "2", "3", NEXT_LABEL]);
    assert!(first[0].active);
    assert_eq!(first[3].kind, LinkKind::Next);
    assert_eq!(first[3].page, 2);

    p.go_to(2);
    let middle = p.links();
    assert_eq!(middle.first().unwrap().label, PREVIOUS_LABEL);
    assert_eq!(middle.first().unwrap().page, 1);
    assert_eq!(middle.last().unwrap().label, NEXT_LABEL);
    assert_eq!(middle.iter().filter(|l| l.active).count(), 1);

    p.go_to(3);
    let last = p.links();
    assert_eq!(last.last().unwrap().label, "3");
}

#[test]
fn test_single_page_has_no_links() {
    assert!(Paginator::new(8).links().is_empty());
    assert!(Paginator::new(1).links().is_empty());
}

#[test]
fn test_info_text() {
    let mut p = Paginator::new(22);
    p.go_to(2);
    assert_eq!(p.info_text(), "Page 2 of 3 (22 posts)");
    assert_eq!(Paginator::new(0).info_text(), "No posts found");
}

#[test]
fn test_visible_range_and_items() {
    let items: Vec<usize> = (0..22).collect();
    let mut p = Paginator::new(items.len());

    assert_eq!(p.visible_range(), 0..8);
    p.go_to(2);
    assert_eq!(p.page_items(&items), &items[8..16]);
    p.go_to(3);
    assert_eq!(p.page_items(&items), &[16, 17, 18, 19, 20, 21]);

    let few: Vec<usize> = (0..5).collect();
    let single = Paginator::new(few.len());
    assert_eq!(single.page_items(&few), few.as_slice());
}

#[test]
fn test_reset_and_resize() {
    let mut p = Paginator::new(40);
    p.go_to(5);

    p.set_total_items(20);
    assert_eq!(p.current_page(), 3);

    p.reset(12);
    assert_eq!(p.current_page(), 1);
    assert_eq!(p.total_pages(), 2);
}
