//! Footer offset table decoding

use tracing::debug;

use crate::cursor::{ByteCursor, rfind};
use crate::error::ParseError;
use crate::{FOOTER_BEGIN, FOOTER_END};

/// Decoded footer: where it starts and the block offsets it lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Footer {
    /// Position of the "KBEG" marker; audio never extends past it
    pub begin: usize,
    /// Sample block offsets in file order
    pub offsets: Vec<u32>,
}

/// Locate the KBEG/KEND pair and decode the offsets between them
///
/// The markers are searched from the end of the container so stray marker
/// bytes inside audio data cannot shadow the real footer.
pub(crate) fn read_footer(data: &[u8]) -> Result<Footer, ParseError> {
    let begin = rfind(data, FOOTER_BEGIN).ok_or(ParseError::MissingFooter)?;
    let table_start = begin + FOOTER_BEGIN.len();
    let end = rfind(&data[table_start..], FOOTER_END)
        .map(|pos| table_start + pos)
        .ok_or(ParseError::MissingFooter)?;

    let table_len = end - table_start;
    if table_len % 4 != 0 {
        return Err(ParseError::MissingFooter);
    }

    let mut cursor = ByteCursor::at(data, table_start);
    let mut words = Vec::with_capacity(table_len / 4);
    while cursor.position() < end {
        words.push(cursor.read_u32_be()?);
    }

    // Some firmware writes the offset count as the first word
    if let Some(&first) = words.first()
        && first as usize == words.len() - 1
    {
        debug!("Footer carries a count prefix ({})", first);
        words.remove(0);
    }

    debug!(
        "Footer at 0x{:08X}: {} offsets ({} bytes)",
        begin,
        words.len(),
        table_len
    );

    Ok(Footer {
        begin,
        offsets: words,
    })
}
