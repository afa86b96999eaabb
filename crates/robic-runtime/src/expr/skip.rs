use robic_core::ExprErrorKind;

use crate::expr::scan::Cursor;

/// Skip a parenthesized run the cursor is already inside, stopping just past
/// the `)` that closes it. Clamps at end of text.
pub(crate) fn skip_expression(cur: &mut Cursor) {
    let mut level = 0usize;
    while let Some(byte) = cur.bump() {
        match byte {
            b'(' => level += 1,
            b')' => {
                if level == 0 {
                    return;
                }
                level -= 1;
            }
            _ => {}
        }
    }
}

/// Skip a delimited identifier, stopping just past `terminator`. A `(`
/// inside the identifier hides everything to its matching `)`, so a
/// terminator in there does not end the scan early. Clamps at end of text.
pub(crate) fn skip_identifier(cur: &mut Cursor, terminator: u8) {
    while let Some(byte) = cur.bump() {
        if byte == terminator {
            return;
        }
        if byte == b'(' {
            skip_expression(cur);
        }
    }
}

/// Discard a ternary branch without evaluating it: advance to the `:` that
/// closes the current ternary, balancing nested `?`/`:` pairs and stepping
/// over parenthesized runs and identifiers. Running off the level (`)` or
/// end of text) is a malformed ternary.
pub(crate) fn skip_to_ternary_else(cur: &mut Cursor) -> Result<(), ExprErrorKind> {
    let mut ternary_level = 0usize;
    while let Some(byte) = cur.bump() {
        match byte {
            b':' => {
                if ternary_level == 0 {
                    return Ok(());
                }
                ternary_level -= 1;
            }
            b'?' => ternary_level += 1,
            b'(' => skip_expression(cur),
            b')' => break,
            b'\'' | b'&' => skip_identifier(cur, byte),
            _ => {}
        }
    }
    Err(ExprErrorKind::InvalidOperator)
}
