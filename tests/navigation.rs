//! Integration tests for list navigation, scrolling and refresh.
//!
//! Views are built over plain in-memory tags with a one-row-per-story
//! renderer unless a test needs the real one.

use canto::keybindings::Action;
use canto::story::Story;
use canto::tag::Tag;
use canto::theme::ColorPalette;
use canto::view::columns::{Columns, Surface};
use canto::view::render::{ItemRenderer, StoryRenderer};
use canto::view::search::{compile_pattern, SearchKind};
use canto::view::{Command, Effects, View, ViewController};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use ratatui::{buffer::Buffer, layout::Rect};
use std::rc::Rc;

struct OneRow;

impl ItemRenderer for OneRow {
    fn print_item(&self, tag: &Tag, index: usize, _row: isize, _s: &mut dyn Surface) -> usize {
        usize::from(tag.get(index).is_some())
    }
}

fn make_tags(sizes: &[usize]) -> Vec<Tag> {
    sizes
        .iter()
        .enumerate()
        .map(|(t, &n)| {
            let feed = format!("feed{t}");
            let stories: Vec<Story> = (0..n)
                .map(|s| Story::new(format!("{feed}-{s}"), feed.as_str(), format!("story {s}"), ""))
                .collect();
            let mut tag = Tag::for_feed(feed);
            tag.extend(&stories);
            tag
        })
        .collect()
}

fn selected_count(view: &ViewController) -> usize {
    view.tags()
        .iter()
        .flat_map(|t| t.iter())
        .filter(|s| s.is_selected())
        .count()
}

fn scroll_invariant_holds(view: &ViewController) -> bool {
    let Some(entry) = view.current() else {
        return true;
    };
    let lines = view.columns().visible_lines();
    entry.row >= view.offset() && entry.end() <= view.offset() + lines
}

#[test]
fn two_tags_of_three_fit_without_scrolling() {
    let mut view =
        ViewController::new(Columns::new(10, 40, 1), make_tags(&[3, 3]), Rc::new(OneRow)).unwrap();
    let rows: Vec<usize> = view.map().iter().map(|e| e.row).collect();
    assert_eq!(rows, vec![0, 1, 2, 3, 4, 5]);

    for _ in 0..5 {
        view.next_item();
    }
    assert_eq!(view.cursor(), 5);

    let area = Rect::new(0, 0, 40, 10);
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf);
    assert_eq!(view.offset(), 0);
}

#[test]
fn collapsing_keeps_only_the_head_and_its_height() {
    let renderer = Rc::new(StoryRenderer::new(ColorPalette::default()));
    let mut view = ViewController::new(Columns::new(20, 40, 1), make_tags(&[4, 2]), renderer).unwrap();
    let head_rows = view.map().get(0).map(|e| e.rows);

    view.collapse_toggle();
    let tag0: Vec<usize> = view
        .map()
        .iter()
        .filter(|e| e.tag == 0)
        .map(|e| e.story)
        .collect();
    assert_eq!(tag0, vec![0]);
    assert_eq!(view.map().get(0).map(|e| e.rows), head_rows);
    assert_eq!(view.map().len(), 3);
}

#[test]
fn collect_search_keeps_matches_in_order() {
    let stories: Vec<Story> = ["A", "B", "Ab"]
        .iter()
        .map(|t| Story::new(*t, "f", *t, ""))
        .collect();
    let mut tag = Tag::for_feed("f");
    tag.extend(&stories);
    let mut view = ViewController::new(Columns::new(10, 40, 1), vec![tag], Rc::new(OneRow)).unwrap();

    let pattern = compile_pattern("A").unwrap().unwrap();
    let mut fx = Effects::default();
    view.on_search(SearchKind::Collect, &pattern, &mut fx);

    let mut commands = fx.into_commands();
    assert_eq!(commands.len(), 1);
    let Some(Command::Push(pushed)) = commands.pop() else {
        panic!("collect search should push a view");
    };
    let View::List(child) = *pushed else {
        panic!("collect search should push a list view");
    };
    assert_eq!(child.tags().len(), 1);
    assert_eq!(child.tags()[0].name(), "*");
    let titles: Vec<&str> = child.tags()[0].iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "Ab"]);
    assert_eq!(selected_count(&child), 1);
}

#[test]
fn collect_view_reapplies_search_on_refresh() {
    let stories: Vec<Story> = ["apple", "banana"]
        .iter()
        .map(|t| Story::new(*t, "f", *t, ""))
        .collect();
    let mut tag = Tag::for_feed("f");
    tag.extend(&stories);
    let mut view = ViewController::new(Columns::new(10, 40, 1), vec![tag], Rc::new(OneRow)).unwrap();

    let mut fx = Effects::default();
    view.on_search(SearchKind::Collect, &compile_pattern("an").unwrap().unwrap(), &mut fx);
    let Some(Command::Push(pushed)) = fx.into_commands().pop() else {
        panic!("expected a pushed view");
    };
    let View::List(mut child) = *pushed else {
        panic!("expected a list view");
    };

    let fresh: Vec<Story> = ["mango", "apple", "banana"]
        .iter()
        .map(|t| Story::new(*t, "f", *t, ""))
        .collect();
    child.reconcile(&fresh);
    let titles: Vec<&str> = child.tags()[0].iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["mango", "banana"]);
    assert_eq!(child.selected_story().map(|s| s.title.as_str()), Some("banana"));
}

#[test]
fn perform_maps_every_list_action() {
    let mut view =
        ViewController::new(Columns::new(10, 40, 1), make_tags(&[2, 2]), Rc::new(OneRow)).unwrap();
    let mut fx = Effects::default();
    view.perform(Action::NextTag, &mut fx);
    assert_eq!(view.cursor(), 2);
    view.perform(Action::PrevTag, &mut fx);
    assert_eq!(view.cursor(), 0);
    view.perform(Action::ToggleMark, &mut fx);
    view.perform(Action::NextItem, &mut fx);
    view.perform(Action::PrevMark, &mut fx);
    assert_eq!(view.cursor(), 0);
    view.perform(Action::AllRead, &mut fx);
    assert!(view.tags().iter().all(|t| t.unread_count() == 0));
    assert!(fx.is_empty());
}

proptest! {
    #[test]
    fn exactly_one_story_selected_after_construction(
        sizes in prop::collection::vec(0usize..5, 1..6)
    ) {
        prop_assume!(sizes.iter().any(|&n| n > 0));
        let view = ViewController::new(Columns::new(5, 40, 1), make_tags(&sizes), Rc::new(OneRow)).unwrap();
        prop_assert_eq!(selected_count(&view), 1);
        let first = sizes.iter().position(|&n| n > 0).unwrap();
        prop_assert_eq!(view.current().map(|e| (e.tag, e.story)), Some((first, 0)));
    }

    #[test]
    fn next_then_prev_restores_interior_cursor(
        sizes in prop::collection::vec(1usize..5, 1..5),
        steps in 0usize..20
    ) {
        let mut view = ViewController::new(Columns::new(5, 40, 1), make_tags(&sizes), Rc::new(OneRow)).unwrap();
        let last = view.map().len() - 1;
        for _ in 0..steps.min(last) {
            view.next_item();
        }
        let before = view.cursor();
        prop_assume!(before < last);
        view.next_item();
        view.prev_item();
        prop_assert_eq!(view.cursor(), before);
        prop_assert_eq!(selected_count(&view), 1);
    }

    #[test]
    fn selection_stays_visible_under_navigation(
        sizes in prop::collection::vec(0usize..6, 1..6),
        height in 2u16..8,
        count in 1u16..4,
        ops in prop::collection::vec(0u8..8, 0..40)
    ) {
        prop_assume!(sizes.iter().any(|&n| n > 0));
        let renderer = Rc::new(StoryRenderer::new(ColorPalette::default()));
        let mut view = ViewController::new(Columns::new(height, 60, count), make_tags(&sizes), renderer).unwrap();
        for op in ops {
            match op {
                0 => view.next_item(),
                1 => view.prev_item(),
                2 => view.next_tag(),
                3 => view.prev_tag(),
                4 => view.collapse_toggle(),
                5 => view.collapse_all_set(false),
                6 => view.mark_toggle(),
                _ => view.next_mark(),
            }
            view.check_scroll();
            prop_assert!(scroll_invariant_holds(&view));
            prop_assert_eq!(selected_count(&view), 1);
        }
    }

    #[test]
    fn reconcile_keeps_surviving_story(
        sizes in prop::collection::vec(1usize..5, 1..4),
        steps in 0usize..12,
        drop_selected in any::<bool>()
    ) {
        let tags = make_tags(&sizes);
        let all: Vec<Story> = tags.iter().flat_map(|t| t.iter().cloned()).collect();
        let mut view = ViewController::new(Columns::new(5, 40, 1), tags, Rc::new(OneRow)).unwrap();
        for _ in 0..steps {
            view.next_item();
        }
        let before = view.current().unwrap();
        let selected_id = view.selected_story().unwrap().id.clone();

        let fresh: Vec<Story> = all
            .iter()
            .filter(|s| !(drop_selected && s.id == selected_id))
            .cloned()
            .collect();
        view.reconcile(&fresh);

        if drop_selected {
            let first = view.map().first_of_tag(before.tag)
                .or_else(|| view.map().iter().position(|e| e.tag > before.tag))
                .or_else(|| view.map().last_index());
            prop_assert_eq!(Some(view.cursor()), first.or(Some(0)));
        } else {
            prop_assert_eq!(view.selected_story().map(|s| s.id.clone()), Some(selected_id));
        }
        if !view.map().is_empty() {
            prop_assert_eq!(selected_count(&view), 1);
        }
    }
}
