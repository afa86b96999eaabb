use robic_core::{ContextId, VariableSource, WorldVersion};

use crate::expr::interp::variable_text;
use crate::expr::scan::Cursor;
use crate::expr::Evaluator;

/// Longest translated message, in bytes. Scanning stops once the output is
/// full; an overlong message is cut short, never an error.
pub const MESSAGE_CAPACITY: usize = 512;

const NAME_CAPACITY: usize = 256;

/// Expand a script message into display text.
///
/// `(expr)` evaluates and splices its decimal value (format version 2.68
/// up; a failed expression leaves a literal `(` and the raw text). `&&` is
/// a literal ampersand. `&name&` splices the named variable with the same
/// conversion rules expression interpolation uses; the gathered name may
/// itself contain `(expr)` splices. Everything else copies through.
pub fn translate_message(
    message: &str,
    vars: &mut dyn VariableSource,
    context: ContextId,
) -> Vec<u8> {
    let bytes = message.as_bytes();
    let inline_exprs = vars.format_version(context) >= WorldVersion::INLINE_EXPRESSIONS;
    let mut evaluator = Evaluator::new();
    let mut cur = Cursor::new(bytes);
    let mut out: Vec<u8> = Vec::with_capacity(MESSAGE_CAPACITY);

    while out.len() < MESSAGE_CAPACITY {
        let Some(byte) = cur.bump() else {
            break;
        };
        match byte {
            b'(' if inline_exprs => {
                let after_open = cur.pos();
                match evaluator.evaluate(&message[after_open..], vars, context) {
                    Ok(done) => {
                        push_capped(&mut out, done.value.to_string().as_bytes());
                        cur.advance_to(after_open + done.end);
                    }
                    Err(_) => {
                        // Leave the paren and rescan its content as text.
                        push_capped(&mut out, b"(");
                    }
                }
            }
            b'&' => {
                if cur.eat(b'&') {
                    push_capped(&mut out, b"&");
                    continue;
                }
                let name = gather_name(&mut cur, message, &mut evaluator, vars, context, inline_exprs);
                push_capped(&mut out, &variable_text(&name, vars, context));
            }
            _ => push_capped(&mut out, &[byte]),
        }
    }
    out
}

/// Gather a `&`-delimited variable name, evaluating `(expr)` splices inside
/// it. A message ending mid-name keeps what was gathered.
fn gather_name(
    cur: &mut Cursor,
    message: &str,
    evaluator: &mut Evaluator,
    vars: &mut dyn VariableSource,
    context: ContextId,
    inline_exprs: bool,
) -> Vec<u8> {
    let mut name: Vec<u8> = Vec::new();
    loop {
        let Some(byte) = cur.bump() else {
            return name;
        };
        match byte {
            b'&' => return name,
            b'(' if inline_exprs => {
                let after_open = cur.pos();
                match evaluator.evaluate(&message[after_open..], vars, context) {
                    Ok(done) => {
                        push_name_capped(&mut name, done.value.to_string().as_bytes());
                        cur.advance_to(after_open + done.end);
                    }
                    Err(error) => {
                        // A failed splice contributes nothing; resume past
                        // wherever its scan stopped.
                        cur.advance_to(after_open + error.offset);
                    }
                }
            }
            _ => push_name_capped(&mut name, &[byte]),
        }
    }
}

fn push_capped(out: &mut Vec<u8>, src: &[u8]) {
    let room = MESSAGE_CAPACITY - out.len();
    out.extend_from_slice(&src[..src.len().min(room)]);
}

fn push_name_capped(name: &mut Vec<u8>, src: &[u8]) {
    let room = NAME_CAPACITY - name.len();
    name.extend_from_slice(&src[..src.len().min(room)]);
}

#[cfg(test)]
mod message_tests {
    use super::*;
    use crate::world::World;

    fn translate(world: &mut World, message: &str) -> String {
        String::from_utf8_lossy(&translate_message(message, world, ContextId::default()))
            .into_owned()
    }

    #[test]
    fn plain_text_copies_through() {
        let mut world = World::new();
        assert_eq!(translate(&mut world, "hello, world"), "hello, world");
    }

    #[test]
    fn doubled_ampersand_is_literal() {
        let mut world = World::new();
        assert_eq!(translate(&mut world, "rock && roll"), "rock & roll");
    }

    #[test]
    fn counter_names_splice_their_values() {
        let mut world = World::new();
        world.set_counter("gems", 12);
        assert_eq!(translate(&mut world, "you have &gems& gems"), "you have 12 gems");
    }

    #[test]
    fn string_variables_and_input_splice_text() {
        let mut world = World::new();
        world.set_string("$name", "ada");
        world.set_input_line("go north");
        assert_eq!(translate(&mut world, "hi &$name&: &input&"), "hi ada: go north");
    }

    #[test]
    fn hex_prefixes_format_counters() {
        let mut world = World::new();
        world.set_counter("n", 255);
        assert_eq!(translate(&mut world, "&+n&/&#n&"), "ff/ff");
    }

    #[test]
    fn expressions_splice_decimal_values() {
        let mut world = World::new();
        world.set_counter("hp", 7);
        assert_eq!(translate(&mut world, "hp doubled: ('hp'*2)"), "hp doubled: 14");
    }

    #[test]
    fn failed_expressions_fall_back_to_literal_text() {
        let mut world = World::new();
        assert_eq!(translate(&mut world, "just (parens"), "just (parens");
    }

    #[test]
    fn expressions_splice_inside_names() {
        let mut world = World::new();
        world.set_counter("idx", 2);
        world.set_counter("slot2", 31);
        assert_eq!(translate(&mut world, "&slot('idx')&"), "31");
    }

    #[test]
    fn old_worlds_treat_parens_as_text() {
        let mut world = World::with_version(WorldVersion::new(2, 51));
        world.set_counter("hp", 7);
        assert_eq!(translate(&mut world, "(1+1)"), "(1+1)");
    }

    #[test]
    fn unterminated_name_keeps_what_was_gathered() {
        let mut world = World::new();
        world.set_counter("gems", 4);
        assert_eq!(translate(&mut world, "count: &gems"), "count: 4");
    }

    #[test]
    fn output_is_capped() {
        let mut world = World::new();
        let long = "z".repeat(MESSAGE_CAPACITY * 2);
        assert_eq!(translate(&mut world, &long).len(), MESSAGE_CAPACITY);
    }
}
