//! Slash menu tests - trigger, filtering, navigation and closing

mod common;

use blockpad::keymap::KeyCode;
use blockpad::messages::{EditorMsg, Msg, SlashMsg};
use blockpad::model::BlockKind;
use blockpad::slash::filter_block_types;
use blockpad::update::update;
use common::{block_id, blocks, press, test_model, type_text};

fn labels(model: &blockpad::EditorModel) -> Vec<&'static str> {
    model.slash.candidates.iter().map(|d| d.label).collect()
}

#[test]
fn test_quo_filters_to_quote() {
    let mut model = test_model("");
    type_text(&mut model, "/quo");
    assert!(model.slash.is_open());
    assert_eq!(labels(&model), vec!["Quote"]);
}

#[test]
fn test_slash_space_never_leaves_menu_open() {
    let mut model = test_model("");
    type_text(&mut model, "/ ");
    assert!(!model.slash.is_open());

    let mut pasted = test_model("");
    update(&mut pasted, Msg::insert_text("/ "));
    assert!(!pasted.slash.is_open());
}

#[test]
fn test_keyword_match_is_case_insensitive() {
    let labels: Vec<_> = filter_block_types("SEPARATOR")
        .iter()
        .map(|d| d.label)
        .collect();
    assert_eq!(labels, vec!["Divider"]);
}

#[test]
fn test_arrows_wrap_both_ways() {
    let mut model = test_model("");
    type_text(&mut model, "/");
    press(&mut model, KeyCode::Up);
    assert_eq!(model.slash.selected_index, 5);
    press(&mut model, KeyCode::Down);
    assert_eq!(model.slash.selected_index, 0);
    assert!(model.slash.is_open());
}

#[test]
fn test_refilter_clamps_selection() {
    let mut model = test_model("");
    type_text(&mut model, "/");
    for _ in 0..4 {
        press(&mut model, KeyCode::Down);
    }
    assert_eq!(model.slash.selected_index, 4);
    type_text(&mut model, "head");
    assert_eq!(labels(&model), vec!["Heading 1", "Heading 2", "Heading 3"]);
    assert_eq!(model.slash.selected_index, 2);
}

#[test]
fn test_escape_closes_without_changes() {
    let mut model = test_model("");
    type_text(&mut model, "/h1");
    press(&mut model, KeyCode::Escape);
    assert!(!model.slash.is_open());
    assert_eq!(blocks(&model), vec![(BlockKind::Paragraph, "/h1".into())]);
}

#[test]
fn test_moving_before_slash_closes() {
    let mut model = test_model("");
    type_text(&mut model, "ab/q");
    press(&mut model, KeyCode::Left);
    assert!(model.slash.is_open());
    assert_eq!(model.slash.query, "");
    press(&mut model, KeyCode::Left);
    assert!(!model.slash.is_open());
}

#[test]
fn test_leaving_the_line_closes() {
    let mut model = test_model("first\n\nsecond");
    let second = block_id(&model, 1);
    type_text(&mut model, "/");
    assert!(model.slash.is_open());
    update(
        &mut model,
        Msg::Editor(EditorMsg::ClickBlock {
            block_id: second,
            offset: 2,
        }),
    );
    assert!(!model.slash.is_open());
}

#[test]
fn test_click_outside_closes() {
    let mut model = test_model("");
    type_text(&mut model, "/");
    update(&mut model, Msg::Editor(EditorMsg::ClickOutside));
    assert!(!model.slash.is_open());
}

#[test]
fn test_anchor_is_fixed_while_typing() {
    let mut model = test_model("line one\nline two");
    let id = block_id(&model, 0);
    model.set_cursor(id, 17);
    type_text(&mut model, " /");
    let anchor = model.slash.anchor;
    assert_eq!(anchor, (1, 10));
    type_text(&mut model, "quo");
    assert_eq!(model.slash.anchor, anchor);
}

#[test]
fn test_pointer_pick_executes_immediately() {
    let mut model = test_model("");
    type_text(&mut model, "title /");
    update(&mut model, Msg::Slash(SlashMsg::Pick(1)));
    assert!(!model.slash.is_open());
    assert_eq!(blocks(&model), vec![(BlockKind::Heading1, "title".into())]);
}

#[test]
fn test_pick_out_of_range_is_ignored() {
    let mut model = test_model("");
    type_text(&mut model, "/quo");
    update(&mut model, Msg::Slash(SlashMsg::Pick(3)));
    assert!(model.slash.is_open());
}
