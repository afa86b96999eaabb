use robic_core::{ContextId, WorldVersion};
use robic_runtime::{translate_message, World, MESSAGE_CAPACITY};

fn translate(world: &mut World, message: &str) -> String {
    String::from_utf8_lossy(&translate_message(message, world, ContextId::default())).into_owned()
}

#[test]
fn messages_mix_text_counters_and_expressions() {
    let mut world = World::new();
    world.set_counter("gems", 7);
    world.set_string("$name", "ada");
    assert_eq!(
        translate(&mut world, "&$name& holds &gems& gems (('gems'+1)*2)"),
        "ada holds 7 gems 16"
    );
}

#[test]
fn interpolation_inside_expressions_inside_messages() {
    let mut world = World::new();
    world.set_counter("idx", 3);
    world.set_counter("door3", 1);
    assert_eq!(translate(&mut world, "open: ('door&idx&')"), "open: 1");
}

#[test]
fn broken_expressions_degrade_to_text() {
    let mut world = World::new();
    world.set_counter("a", 1);
    assert_eq!(translate(&mut world, "(a mess"), "(a mess");
}

#[test]
fn legacy_worlds_keep_parentheses_verbatim() {
    let mut world = World::with_version(WorldVersion::new(2, 62));
    assert_eq!(translate(&mut world, "take (2+2)"), "take (2+2)");
}

#[test]
fn long_messages_are_cut_at_capacity() {
    let mut world = World::new();
    world.set_string("$pad", "x".repeat(400));
    let out = translate(&mut world, "&$pad&&$pad&");
    assert_eq!(out.len(), MESSAGE_CAPACITY);
    assert!(out.bytes().all(|b| b == b'x'));
}
