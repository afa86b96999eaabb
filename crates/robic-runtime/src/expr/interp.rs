use robic_core::{ContextId, VariableSource};

/// Convert an interpolated name's value to the text spliced into the
/// surrounding name. Checked in order: the literal name `INPUT` reads the
/// context's input line; a string variable contributes its raw bytes; a `+`
/// prefix formats the counter as unpadded lowercase hex (unsigned 32-bit);
/// a `#` prefix formats exactly the counter's low byte as two hex digits;
/// anything else is the counter's signed decimal text.
pub(crate) fn variable_text(
    name: &[u8],
    vars: &mut dyn VariableSource,
    context: ContextId,
) -> Vec<u8> {
    if name.eq_ignore_ascii_case(b"INPUT") {
        return vars.input_line(context);
    }
    if vars.is_string(name) {
        return vars.read_string(name, context);
    }
    if let Some(rest) = name.strip_prefix(b"+") {
        let value = vars.read_counter(rest, context);
        return format!("{:x}", value as u32).into_bytes();
    }
    if let Some(rest) = name.strip_prefix(b"#") {
        let value = vars.read_counter(rest, context);
        return format!("{:02x}", value as u8).into_bytes();
    }
    let value = vars.read_counter(name, context);
    value.to_string().into_bytes()
}
