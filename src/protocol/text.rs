//! Text-protocol result set parsing.
//!
//! A text result set arrives as:
//! 1. a column-count packet (length-encoded integer),
//! 2. one column definition packet per column,
//! 3. an EOF packet unless `CLIENT_DEPRECATE_EOF` was negotiated,
//! 4. one row packet per row (length-encoded cells, `0xFB` for NULL),
//! 5. a terminating EOF/OK packet, or an ERR packet if the server failed
//!    mid-stream.
//!
//! Packets here are payloads only; framing and sequence ids belong to the
//! connection layer.

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::protocol::buffer::{ReadBuffer, WriteBuffer};
use crate::protocol::constants::*;
use crate::protocol::types::{ColumnFlags, ColumnMetadata, FieldType, OwnedRow};

/// Server error carried by an ERR packet.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerError {
    /// Server error number.
    pub code: u32,
    /// SQLSTATE, if present.
    pub sql_state: Option<String>,
    /// Error message.
    pub message: String,
}

/// Parsed text result set.
#[derive(Debug, Default)]
pub struct TextResultSet {
    /// Column metadata.
    pub columns: Vec<ColumnMetadata>,
    /// Rows received before the terminator.
    pub rows: Vec<OwnedRow>,
    /// Error that cut the row stream short, if any.
    pub error: Option<ServerError>,
}

/// Parse a column definition packet (protocol 4.1 layout).
pub fn parse_column_definition(payload: Bytes) -> Result<ColumnMetadata> {
    let mut buf = ReadBuffer::new(payload);

    let _catalog = buf.read_lenenc_str()?;
    let _schema = buf.read_lenenc_str()?;
    let table = buf.read_lenenc_str()?;
    let org_table = buf.read_lenenc_str()?;
    let name = buf.read_lenenc_str()?;
    let org_name = buf.read_lenenc_str()?;

    let fixed_len = buf.read_lenenc_int()?;
    if fixed_len != COLUMN_DEFINITION_FIXED_LENGTH {
        return Err(Error::protocol(format!(
            "Unexpected column definition fixed length: {}",
            fixed_len
        )));
    }
    let charset_nr = buf.read_u16_le()?;
    let length = buf.read_u32_le()?;
    let field_type = FieldType::from_raw(buf.read_u8()?);
    let flags = buf.read_u16_le()?;
    let decimals = buf.read_u8()?;
    buf.skip(2)?; // filler

    // Only COM_FIELD_LIST responses carry a default value.
    let def = if buf.remaining() > 0 {
        buf.read_lenenc_str()?
    } else {
        String::new()
    };

    Ok(ColumnMetadata {
        name,
        org_name,
        table,
        org_table,
        def,
        max_length: 0,
        length: length as u64,
        charset_nr: charset_nr as u32,
        flags: ColumnFlags::from_bits(flags as u32),
        field_type,
        decimals: decimals as u32,
    })
}

/// Parse a text row packet into cells.
pub fn parse_text_row(payload: Bytes, num_columns: usize) -> Result<OwnedRow> {
    let mut buf = ReadBuffer::new(payload);
    let mut cells = Vec::with_capacity(num_columns);

    for _ in 0..num_columns {
        cells.push(buf.read_lenenc_bytes_nullable()?);
    }

    if buf.remaining() > 0 {
        return Err(Error::protocol(format!(
            "Row packet has {} trailing bytes after {} columns",
            buf.remaining(),
            num_columns
        )));
    }

    Ok(OwnedRow::new(cells))
}

/// Parse an ERR packet.
pub fn parse_error_packet(payload: Bytes) -> Result<ServerError> {
    let mut buf = ReadBuffer::new(payload);

    let header = buf.read_u8()?;
    if header != ERR_PACKET_HEADER {
        return Err(Error::protocol(format!(
            "Expected ERR packet, got header {:#04x}",
            header
        )));
    }
    let code = buf.read_u16_le()? as u32;

    let sql_state = if buf.peek_u8() == Some(b'#') {
        buf.skip(1)?;
        let state = buf.read_bytes(5)?;
        Some(String::from_utf8_lossy(&state).into_owned())
    } else {
        None
    };

    let rest = buf.read_bytes(buf.remaining())?;
    Ok(ServerError {
        code,
        sql_state,
        message: String::from_utf8_lossy(&rest).into_owned(),
    })
}

/// Parse a whole text result set from its packet payloads.
///
/// `deprecate_eof` tells whether the session negotiated
/// `CLIENT_DEPRECATE_EOF` (no EOF between column definitions and rows).
pub fn parse_text_result_set<I>(packets: I, deprecate_eof: bool) -> Result<TextResultSet>
where
    I: IntoIterator<Item = Bytes>,
{
    let mut packets = packets.into_iter();
    let mut next = |what: &str| {
        packets
            .next()
            .ok_or_else(|| Error::protocol(format!("Result set ended before {}", what)))
    };

    let first = next("column count")?;
    if first.first() == Some(&ERR_PACKET_HEADER) {
        let err = parse_error_packet(first)?;
        return Ok(TextResultSet {
            error: Some(err),
            ..Default::default()
        });
    }
    let num_columns = ReadBuffer::new(first).read_lenenc_int()? as usize;

    let mut result = TextResultSet::default();
    for _ in 0..num_columns {
        result.columns.push(parse_column_definition(next("column definition")?)?);
    }

    if !deprecate_eof {
        let eof = next("column EOF")?;
        if !is_terminator(&eof) {
            return Err(Error::protocol("Expected EOF after column definitions"));
        }
    }

    loop {
        let packet = next("row terminator")?;
        match packet.first() {
            Some(&ERR_PACKET_HEADER) => {
                result.error = Some(parse_error_packet(packet)?);
                break;
            }
            _ if is_terminator(&packet) => break,
            _ => result.rows.push(parse_text_row(packet, num_columns)?),
        }
    }

    tracing::debug!(
        columns = result.columns.len(),
        rows = result.rows.len(),
        error = result.error.is_some(),
        "parsed text result set"
    );

    Ok(result)
}

/// EOF packets (and OK packets used as terminators under
/// `CLIENT_DEPRECATE_EOF`) start with `0xFE` and are short.
fn is_terminator(packet: &[u8]) -> bool {
    packet.first() == Some(&EOF_PACKET_HEADER) && packet.len() < 9
}

/// Encode a column definition packet (protocol 4.1 layout).
pub fn encode_column_definition(column: &ColumnMetadata) -> Bytes {
    let mut buf = WriteBuffer::new();
    buf.write_lenenc_str("def");
    buf.write_lenenc_str("");
    buf.write_lenenc_str(&column.table);
    buf.write_lenenc_str(&column.org_table);
    buf.write_lenenc_str(&column.name);
    buf.write_lenenc_str(&column.org_name);
    buf.write_lenenc_int(COLUMN_DEFINITION_FIXED_LENGTH);
    buf.write_u16_le(column.charset_nr as u16);
    buf.write_u32_le(column.length as u32);
    buf.write_u8(column.field_type.type_num());
    buf.write_u16_le(column.flags.bits() as u16);
    buf.write_u8(column.decimals as u8);
    buf.write_u16_le(0);
    if !column.def.is_empty() {
        buf.write_lenenc_str(&column.def);
    }
    buf.freeze()
}

/// Encode a text row packet.
pub fn encode_text_row(cells: &[Option<&[u8]>]) -> Bytes {
    let mut buf = WriteBuffer::new();
    for cell in cells {
        buf.write_lenenc_nullable(*cell);
    }
    buf.freeze()
}
