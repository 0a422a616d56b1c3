//! JSON shapes expected by the document service's block and page endpoints.

use crate::page::PageMeta;
use crate::types::{Block, RichText, TableRow};
use serde_json::{Map, Value, json};

/// Longest content the service accepts in one rich text object.
pub const MAX_TEXT_LENGTH: usize = 2000;

/// Converts blocks to their wire objects, in order.
pub fn blocks_to_wire(blocks: &[Block]) -> Vec<Value> {
    blocks.iter().map(block_to_wire).collect()
}

/// Converts one block to its wire object.
pub fn block_to_wire(block: &Block) -> Value {
    let body = match block {
        Block::Heading { text, .. } | Block::Paragraph { text } => {
            json!({ "rich_text": rich_text_to_wire(text) })
        }
        Block::Image { url } => json!({
            "type": "external",
            "external": { "url": url },
        }),
        Block::BulletedItem { text, children }
        | Block::NumberedItem { text, children }
        | Block::Quote { text, children } => {
            with_children(json!({ "rich_text": rich_text_to_wire(text) }), children)
        }
        Block::Code { text, language } => json!({
            "rich_text": rich_text_to_wire(&RichText::plain(text.as_str())),
            "language": language,
        }),
        Block::Callout {
            text,
            icon,
            children,
        } => with_children(
            json!({
                "rich_text": rich_text_to_wire(text),
                "icon": { "type": "emoji", "emoji": icon },
            }),
            children,
        ),
        Block::Divider => json!({}),
        Block::Table {
            width,
            has_column_header,
            rows,
        } => {
            let rows: Vec<Value> = rows.iter().map(table_row_to_wire).collect();
            json!({
                "table_width": width,
                "has_column_header": has_column_header,
                "has_row_header": false,
                "children": rows,
            })
        }
    };

    typed_block(block.kind(), body)
}

/// Converts rich text to wire text objects.
///
/// Spans longer than [`MAX_TEXT_LENGTH`] characters are split into
/// consecutive objects with the same styling.
pub fn rich_text_to_wire(text: &RichText) -> Vec<Value> {
    let mut objects = Vec::new();
    for span in text.spans() {
        for piece in split_chars(&span.content, MAX_TEXT_LENGTH) {
            let mut inner = json!({ "content": piece });
            if let Some(url) = &span.link {
                inner["link"] = json!({ "url": url });
            }

            let mut object = json!({ "type": "text", "text": inner });
            if let Some(annotations) = &span.annotations {
                object["annotations"] = json!(annotations);
            }
            objects.push(object);
        }
    }
    objects
}

/// The `properties` object of a page: just its title.
pub fn page_properties(meta: &PageMeta) -> Value {
    json!({
        "title": [{ "text": { "content": meta.title } }],
    })
}

/// Request body creating a page with its first batch of children.
pub fn page_create_body(meta: &PageMeta, children: &[Block]) -> Value {
    let mut body = json!({
        "properties": page_properties(meta),
        "children": blocks_to_wire(children),
    });
    if let Some(parent) = &meta.parent_page_id {
        body["parent"] = json!({ "page_id": parent });
    }
    if let Some(icon) = &meta.icon {
        body["icon"] = json!({ "type": "emoji", "emoji": icon });
    }
    if let Some(cover) = &meta.cover {
        body["cover"] = json!({ "type": "external", "external": { "url": cover } });
    }
    body
}

/// Request body appending a batch of children to an existing block or page.
pub fn append_children_body(children: &[Block]) -> Value {
    json!({ "children": blocks_to_wire(children) })
}

fn typed_block(kind: &str, body: Value) -> Value {
    let mut object = Map::new();
    object.insert("object".to_string(), Value::from("block"));
    object.insert("type".to_string(), Value::from(kind));
    object.insert(kind.to_string(), body);
    Value::Object(object)
}

fn with_children(mut body: Value, children: &[Block]) -> Value {
    if !children.is_empty() {
        body["children"] = Value::Array(blocks_to_wire(children));
    }
    body
}

fn table_row_to_wire(row: &TableRow) -> Value {
    let cells: Vec<Vec<Value>> = row.cells.iter().map(rich_text_to_wire).collect();
    typed_block("table_row", json!({ "cells": cells }))
}

/// Splits `text` into pieces of at most `max` characters.
fn split_chars(text: &str, max: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(max)
            .map_or(rest.len(), |(index, _)| index);
        let (piece, tail) = rest.split_at(cut);
        pieces.push(piece);
        rest = tail;
    }
    pieces
}
