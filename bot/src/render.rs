//! Embed builders for echoes and history pages.

use chrono::{DateTime, Utc};
use discord_client::Embed;
use echo_db::MessageRecord;
use rand::Rng;

/// Palette an echo color is drawn from.
pub const ECHO_COLORS: [u32; 2] = [0x000000, 0xB0C0FF];
pub const HISTORY_COLOR: u32 = 0xB0C0FF;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Uniform pick over [`ECHO_COLORS`].
pub fn pick_color() -> u32 {
    ECHO_COLORS[rand::thread_rng().gen_range(0..ECHO_COLORS.len())]
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn echo_embed(author: &str, text: &str, color: u32, at: DateTime<Utc>) -> Embed {
    Embed::new("Echo")
        .description(text)
        .color(color)
        .footer(format!("Sent by {author} at {} UTC", format_timestamp(at)))
}

pub fn edited_embed(editor: &str, text: &str, color: u32, at: DateTime<Utc>) -> Embed {
    Embed::new("Echo (Edited)")
        .description(text)
        .color(color)
        .footer(format!("Edited by {editor} at {} UTC", format_timestamp(at)))
}

pub fn history_embed(records: &[MessageRecord], page: u64, total_pages: u64) -> Embed {
    records.iter().fold(
        Embed::new(format!("Message History (Page {page}/{total_pages})")).color(HISTORY_COLOR),
        |embed, record| {
            embed.field(
                format!(
                    "{} (at {} UTC)",
                    record.author,
                    format_timestamp(record.created_at_utc())
                ),
                format!("\"{}\" in #{}", record.content, record.channel),
                false,
            )
        },
    )
}
