use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use super::types::{
    CodeLockSpec, ColorType, Inspectable, PercentRect, PlacementSlot, PlacementSpec, Prop,
    StateOverlay, Wall, WallId, Zone, ZoneKind,
};

const DEFAULT_WALL_COLOR: [u8; 3] = [40, 40, 40];
const DEFAULT_OVERLAY_TINT: [u8; 4] = [0, 0, 0, 179];
const DEFAULT_OPENS_FLAG: &str = "doorOpen";
const DEFAULT_KNOB_FLAG: &str = "tvHasKnob";
const DEFAULT_FIXED_FLAG: &str = "tvFixed";
const DEFAULT_UNLOCKED_FLAG: &str = "drawerUnlocked";
const DEFAULT_OPEN_FLAG: &str = "drawerOpen";
const DEFAULT_EMPTY_TEXT: &str = "Nothing has been placed here yet.";
const DEFAULT_PARTIAL_TEXT: &str = "Something is still missing.";
const DEFAULT_COMPLETE_TEXT: &str = "It is complete.";
const DEFAULT_REVEAL_TEXT: &str = "Something comes loose!";

const WALL_FIELDS: &[&str] = &[
    "index",
    "name",
    "color",
    "background",
    "zones",
    "props",
    "overlays",
];
const ZONE_COMMON_FIELDS: &[&str] = &["id", "name", "type", "color", "top", "left", "width", "height"];
const PROP_FIELDS: &[&str] = &["id", "image", "top", "left", "width", "height", "zoneId"];
const OVERLAY_FIELDS: &[&str] = &["flag", "label", "top", "left", "width", "height", "tint"];
const SLOT_FIELDS: &[&str] = &["item", "flag"];
const INSPECT_FIELDS: &[&str] = &["id", "title", "lines"];
const FLAG_FIELDS: &[&str] = &["name"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownDefType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    UnknownZoneType,
}

#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub chapter: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (chapter={}, file={}, line={}, column={})",
                self.code,
                self.message,
                self.chapter,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (chapter={}, file={})",
                self.code,
                self.message,
                self.chapter,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentCompileError {}

#[derive(Debug, Clone)]
pub(crate) struct CompiledCatalog {
    pub walls: Vec<Wall>,
    pub flags: Vec<String>,
    pub inspectables: Vec<Inspectable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZoneTypeTag {
    PickupItem,
    ConditionalPickup,
    LockedObject,
    TvInteractive,
    Inspect,
    CodeLock,
    Conditional,
    Placement,
}

const ZONE_TYPE_TOKENS: &[&str] = &[
    "pickupItem",
    "conditionalPickup",
    "lockedObject",
    "tvInteractive",
    "inspect",
    "codelock",
    "conditional",
    "placement",
];

impl ZoneTypeTag {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "pickupItem" => Some(Self::PickupItem),
            "conditionalPickup" => Some(Self::ConditionalPickup),
            "lockedObject" => Some(Self::LockedObject),
            "tvInteractive" => Some(Self::TvInteractive),
            "inspect" => Some(Self::Inspect),
            "codelock" => Some(Self::CodeLock),
            "conditional" => Some(Self::Conditional),
            "placement" => Some(Self::Placement),
            _ => None,
        }
    }

    fn fields(self) -> &'static [&'static str] {
        match self {
            Self::PickupItem => &["itemName"],
            Self::ConditionalPickup => &["itemName", "requiresState"],
            Self::LockedObject => &["requiredItem", "opensFlag", "noun"],
            Self::TvInteractive => &["requiredItem", "knobFlag", "fixedFlag", "display"],
            Self::Inspect => &["inspectItem"],
            Self::CodeLock => &["correctCode", "unlockedFlag", "openFlag", "noun", "contents"],
            Self::Conditional => &["requiredState"],
            Self::Placement => &[
                "slots",
                "noun",
                "revealsFlag",
                "bonusItem",
                "revealText",
                "emptyText",
                "partialText",
                "completeText",
            ],
        }
    }
}

struct DocContext<'a, 'input> {
    chapter: &'a str,
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl DocContext<'_, '_> {
    fn error_at(
        &self,
        code: ContentErrorCode,
        message: String,
        node: Node<'_, '_>,
    ) -> ContentCompileError {
        let pos = self.doc.text_pos_at(node.range().start);
        ContentCompileError {
            code,
            message,
            chapter: self.chapter.to_string(),
            file_path: self.file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: pos.row as usize,
                column: pos.col as usize,
            }),
        }
    }
}

/// Field elements of one def node, keyed by tag name.
struct Fields<'a, 'input> {
    owner: &'static str,
    node: Node<'a, 'input>,
    by_name: HashMap<String, Node<'a, 'input>>,
}

impl<'a, 'input> Fields<'a, 'input> {
    fn collect(
        ctx: &DocContext<'a, 'input>,
        owner: &'static str,
        node: Node<'a, 'input>,
    ) -> Result<Self, ContentCompileError> {
        let mut by_name = HashMap::new();
        for field in node.children().filter(|child| child.is_element()) {
            let field_name = field.tag_name().name().to_string();
            if by_name.insert(field_name.clone(), field).is_some() {
                return Err(ctx.error_at(
                    ContentErrorCode::DuplicateField,
                    format!("duplicate field <{field_name}> in {owner}"),
                    field,
                ));
            }
        }
        Ok(Self {
            owner,
            node,
            by_name,
        })
    }

    fn reject_unknown(
        &self,
        ctx: &DocContext<'a, 'input>,
        allowed: &[&[&str]],
    ) -> Result<(), ContentCompileError> {
        for (name, field) in &self.by_name {
            let known = allowed.iter().any(|list| list.contains(&name.as_str()));
            if !known {
                return Err(ctx.error_at(
                    ContentErrorCode::UnknownField,
                    format!("unknown field <{}> in {}", name, self.owner),
                    *field,
                ));
            }
        }
        Ok(())
    }

    fn get(&self, name: &str) -> Option<Node<'a, 'input>> {
        self.by_name.get(name).copied()
    }

    fn optional_text(
        &self,
        ctx: &DocContext<'a, 'input>,
        name: &str,
    ) -> Result<Option<String>, ContentCompileError> {
        let Some(field) = self.get(name) else {
            return Ok(None);
        };
        let value = field.text().map(str::trim).unwrap_or_default().to_string();
        if value.is_empty() {
            return Err(ctx.error_at(
                ContentErrorCode::MissingField,
                format!("field <{name}> must not be empty"),
                field,
            ));
        }
        Ok(Some(value))
    }

    fn required_text(
        &self,
        ctx: &DocContext<'a, 'input>,
        name: &str,
    ) -> Result<String, ContentCompileError> {
        self.optional_text(ctx, name)?
            .ok_or_else(|| self.missing(ctx, name))
    }

    fn optional_number(
        &self,
        ctx: &DocContext<'a, 'input>,
        name: &str,
    ) -> Result<Option<f32>, ContentCompileError> {
        let Some(value) = self.optional_text(ctx, name)? else {
            return Ok(None);
        };
        let field = self.get(name).unwrap_or(self.node);
        let parsed = value.parse::<f32>().map_err(|_| {
            ctx.error_at(
                ContentErrorCode::InvalidValue,
                format!("{name} '{value}' is not a valid number"),
                field,
            )
        })?;
        if !parsed.is_finite() || parsed < 0.0 {
            return Err(ctx.error_at(
                ContentErrorCode::InvalidValue,
                format!("{name} must be finite and >= 0"),
                field,
            ));
        }
        Ok(Some(parsed))
    }

    fn required_number(
        &self,
        ctx: &DocContext<'a, 'input>,
        name: &str,
    ) -> Result<f32, ContentCompileError> {
        self.optional_number(ctx, name)?
            .ok_or_else(|| self.missing(ctx, name))
    }

    fn rect(&self, ctx: &DocContext<'a, 'input>) -> Result<PercentRect, ContentCompileError> {
        Ok(PercentRect {
            top: self.required_number(ctx, "top")?,
            left: self.required_number(ctx, "left")?,
            width: self.required_number(ctx, "width")?,
            height: self.required_number(ctx, "height")?,
        })
    }

    fn color(
        &self,
        ctx: &DocContext<'a, 'input>,
        name: &str,
    ) -> Result<Option<[u8; 4]>, ContentCompileError> {
        let Some(value) = self.optional_text(ctx, name)? else {
            return Ok(None);
        };
        parse_hex_color(&value).map(Some).ok_or_else(|| {
            ctx.error_at(
                ContentErrorCode::InvalidValue,
                format!("{name} '{value}' must be #RRGGBB or #RRGGBBAA"),
                self.get(name).unwrap_or(self.node),
            )
        })
    }

    /// `<li>` children of a list field; absent lists are empty.
    fn list_items(
        &self,
        ctx: &DocContext<'a, 'input>,
        name: &str,
    ) -> Result<Vec<Node<'a, 'input>>, ContentCompileError> {
        let Some(field) = self.get(name) else {
            return Ok(Vec::new());
        };
        let mut items = Vec::new();
        for child in field.children().filter(|child| child.is_element()) {
            if child.tag_name().name() != "li" {
                return Err(ctx.error_at(
                    ContentErrorCode::UnknownField,
                    format!(
                        "list <{name}> may only contain <li>, found <{}>",
                        child.tag_name().name()
                    ),
                    child,
                ));
            }
            items.push(child);
        }
        Ok(items)
    }

    fn missing(&self, ctx: &DocContext<'a, 'input>, name: &str) -> ContentCompileError {
        ctx.error_at(
            ContentErrorCode::MissingField,
            format!("missing required field <{name}> in {}", self.owner),
            self.node,
        )
    }
}

pub(crate) fn parse_catalog_document(
    chapter: &str,
    file_path: &Path,
    raw: &str,
) -> Result<CompiledCatalog, ContentCompileError> {
    let doc = Document::parse(raw).map_err(|error| ContentCompileError {
        code: ContentErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        chapter: chapter.to_string(),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;
    let ctx = DocContext {
        chapter,
        file_path,
        doc: &doc,
    };

    let root = doc.root_element();
    if root.tag_name().name() != "Defs" {
        return Err(ctx.error_at(
            ContentErrorCode::InvalidRoot,
            "root element must be <Defs>".to_string(),
            root,
        ));
    }

    let mut compiled = CompiledCatalog {
        walls: Vec::new(),
        flags: Vec::new(),
        inspectables: Vec::new(),
    };
    for child in root.children().filter(|node| node.is_element()) {
        match child.tag_name().name() {
            "FlagDef" => {
                let fields = Fields::collect(&ctx, "<FlagDef>", child)?;
                fields.reject_unknown(&ctx, &[FLAG_FIELDS])?;
                let name = fields.required_text(&ctx, "name")?;
                if compiled.flags.contains(&name) {
                    return Err(ctx.error_at(
                        ContentErrorCode::InvalidValue,
                        format!("flag '{name}' is declared more than once"),
                        child,
                    ));
                }
                compiled.flags.push(name);
            }
            "WallDef" => compiled.walls.push(parse_wall(&ctx, child)?),
            "InspectDef" => compiled.inspectables.push(parse_inspectable(&ctx, child)?),
            other => {
                return Err(ctx.error_at(
                    ContentErrorCode::UnknownDefType,
                    format!(
                        "unsupported def type <{other}>; expected <FlagDef>, <WallDef> or <InspectDef>"
                    ),
                    child,
                ))
            }
        }
    }

    Ok(compiled)
}

fn parse_wall<'a, 'input>(
    ctx: &DocContext<'a, 'input>,
    node: Node<'a, 'input>,
) -> Result<Wall, ContentCompileError> {
    let fields = Fields::collect(ctx, "<WallDef>", node)?;
    fields.reject_unknown(ctx, &[WALL_FIELDS])?;

    let index_text = fields.required_text(ctx, "index")?;
    let id = index_text
        .parse::<usize>()
        .ok()
        .and_then(WallId::new)
        .ok_or_else(|| {
            ctx.error_at(
                ContentErrorCode::InvalidValue,
                format!("wall index '{index_text}' must be 0, 1, 2 or 3"),
                fields.get("index").unwrap_or(node),
            )
        })?;
    let name = fields.required_text(ctx, "name")?;
    let color = fields
        .color(ctx, "color")?
        .map(|[r, g, b, _]| [r, g, b])
        .unwrap_or(DEFAULT_WALL_COLOR);
    let background = fields.optional_text(ctx, "background")?;

    let zones = fields
        .list_items(ctx, "zones")?
        .into_iter()
        .map(|item| parse_zone(ctx, item))
        .collect::<Result<Vec<_>, _>>()?;
    let props = fields
        .list_items(ctx, "props")?
        .into_iter()
        .map(|item| parse_prop(ctx, item))
        .collect::<Result<Vec<_>, _>>()?;
    let overlays = fields
        .list_items(ctx, "overlays")?
        .into_iter()
        .map(|item| parse_overlay(ctx, item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Wall {
        id,
        name,
        color,
        background,
        zones,
        props,
        overlays,
    })
}

fn parse_zone<'a, 'input>(
    ctx: &DocContext<'a, 'input>,
    node: Node<'a, 'input>,
) -> Result<Zone, ContentCompileError> {
    let fields = Fields::collect(ctx, "zone", node)?;
    let type_token = fields.required_text(ctx, "type")?;
    let Some(tag) = ZoneTypeTag::parse(&type_token) else {
        return Err(ctx.error_at(
            ContentErrorCode::UnknownZoneType,
            format!(
                "unknown zone type '{type_token}'; allowed values: {}",
                ZONE_TYPE_TOKENS.join(", ")
            ),
            fields.get("type").unwrap_or(node),
        ));
    };
    fields.reject_unknown(ctx, &[ZONE_COMMON_FIELDS, tag.fields()])?;

    let id = fields.required_text(ctx, "id")?;
    let name = fields.required_text(ctx, "name")?;
    let color_type = match fields.optional_text(ctx, "color")? {
        None => ColorType::Default,
        Some(token) => ColorType::from_token(&token).ok_or_else(|| {
            ctx.error_at(
                ContentErrorCode::InvalidValue,
                format!(
                    "invalid zone color '{token}'; allowed values: exit, puzzle, item, lore, default"
                ),
                fields.get("color").unwrap_or(node),
            )
        })?,
    };
    let rect = fields.rect(ctx)?;
    let default_noun = || name.to_lowercase();

    let kind = match tag {
        ZoneTypeTag::PickupItem => ZoneKind::PickupItem {
            item_name: fields.required_text(ctx, "itemName")?,
        },
        ZoneTypeTag::ConditionalPickup => ZoneKind::ConditionalPickup {
            item_name: fields.required_text(ctx, "itemName")?,
            requires_state: fields.required_text(ctx, "requiresState")?,
        },
        ZoneTypeTag::LockedObject => ZoneKind::LockedObject {
            required_item: fields.required_text(ctx, "requiredItem")?,
            opens_flag: fields
                .optional_text(ctx, "opensFlag")?
                .unwrap_or_else(|| DEFAULT_OPENS_FLAG.to_string()),
            noun: fields
                .optional_text(ctx, "noun")?
                .unwrap_or_else(default_noun),
        },
        ZoneTypeTag::TvInteractive => ZoneKind::TvInteractive {
            knob_item: fields.required_text(ctx, "requiredItem")?,
            knob_flag: fields
                .optional_text(ctx, "knobFlag")?
                .unwrap_or_else(|| DEFAULT_KNOB_FLAG.to_string()),
            fixed_flag: fields
                .optional_text(ctx, "fixedFlag")?
                .unwrap_or_else(|| DEFAULT_FIXED_FLAG.to_string()),
            display: fields.required_text(ctx, "display")?,
        },
        ZoneTypeTag::Inspect => ZoneKind::Inspect {
            inspect_item: fields.required_text(ctx, "inspectItem")?,
        },
        ZoneTypeTag::CodeLock => ZoneKind::CodeLock(CodeLockSpec {
            correct_code: fields.required_text(ctx, "correctCode")?,
            unlocked_flag: fields
                .optional_text(ctx, "unlockedFlag")?
                .unwrap_or_else(|| DEFAULT_UNLOCKED_FLAG.to_string()),
            open_flag: fields
                .optional_text(ctx, "openFlag")?
                .unwrap_or_else(|| DEFAULT_OPEN_FLAG.to_string()),
            noun: fields
                .optional_text(ctx, "noun")?
                .unwrap_or_else(default_noun),
            contents: fields.optional_text(ctx, "contents")?,
        }),
        ZoneTypeTag::Conditional => ZoneKind::Conditional {
            required_state: fields.required_text(ctx, "requiredState")?,
        },
        ZoneTypeTag::Placement => {
            ZoneKind::Placement(parse_placement(ctx, &fields, &default_noun())?)
        },
    };

    Ok(Zone {
        id,
        name,
        rect,
        color_type,
        kind,
    })
}

fn parse_placement<'a, 'input>(
    ctx: &DocContext<'a, 'input>,
    fields: &Fields<'a, 'input>,
    default_noun: &str,
) -> Result<PlacementSpec, ContentCompileError> {
    if fields.get("slots").is_none() {
        return Err(fields.missing(ctx, "slots"));
    }
    let mut slots = Vec::new();
    for item in fields.list_items(ctx, "slots")? {
        let slot_fields = Fields::collect(ctx, "placement slot", item)?;
        slot_fields.reject_unknown(ctx, &[SLOT_FIELDS])?;
        slots.push(PlacementSlot {
            item: slot_fields.required_text(ctx, "item")?,
            flag: slot_fields.required_text(ctx, "flag")?,
        });
    }

    Ok(PlacementSpec {
        slots,
        noun: fields
            .optional_text(ctx, "noun")?
            .unwrap_or_else(|| default_noun.to_string()),
        reveals_flag: fields.required_text(ctx, "revealsFlag")?,
        bonus_item: fields.required_text(ctx, "bonusItem")?,
        reveal_text: fields
            .optional_text(ctx, "revealText")?
            .unwrap_or_else(|| DEFAULT_REVEAL_TEXT.to_string()),
        empty_text: fields
            .optional_text(ctx, "emptyText")?
            .unwrap_or_else(|| DEFAULT_EMPTY_TEXT.to_string()),
        partial_text: fields
            .optional_text(ctx, "partialText")?
            .unwrap_or_else(|| DEFAULT_PARTIAL_TEXT.to_string()),
        complete_text: fields
            .optional_text(ctx, "completeText")?
            .unwrap_or_else(|| DEFAULT_COMPLETE_TEXT.to_string()),
    })
}

fn parse_prop<'a, 'input>(
    ctx: &DocContext<'a, 'input>,
    node: Node<'a, 'input>,
) -> Result<Prop, ContentCompileError> {
    let fields = Fields::collect(ctx, "prop", node)?;
    fields.reject_unknown(ctx, &[PROP_FIELDS])?;
    Ok(Prop {
        id: fields.required_text(ctx, "id")?,
        image: fields.optional_text(ctx, "image")?,
        top: fields.required_number(ctx, "top")?,
        left: fields.required_number(ctx, "left")?,
        width: fields.required_number(ctx, "width")?,
        height: fields.optional_number(ctx, "height")?,
        zone_id: fields.optional_text(ctx, "zoneId")?,
    })
}

fn parse_overlay<'a, 'input>(
    ctx: &DocContext<'a, 'input>,
    node: Node<'a, 'input>,
) -> Result<StateOverlay, ContentCompileError> {
    let fields = Fields::collect(ctx, "overlay", node)?;
    fields.reject_unknown(ctx, &[OVERLAY_FIELDS])?;
    Ok(StateOverlay {
        flag: fields.required_text(ctx, "flag")?,
        label: fields.required_text(ctx, "label")?,
        rect: fields.rect(ctx)?,
        tint: fields.color(ctx, "tint")?.unwrap_or(DEFAULT_OVERLAY_TINT),
    })
}

fn parse_inspectable<'a, 'input>(
    ctx: &DocContext<'a, 'input>,
    node: Node<'a, 'input>,
) -> Result<Inspectable, ContentCompileError> {
    let fields = Fields::collect(ctx, "<InspectDef>", node)?;
    fields.reject_unknown(ctx, &[INSPECT_FIELDS])?;
    let lines = fields
        .list_items(ctx, "lines")?
        .into_iter()
        .map(|item| item.text().map(str::trim).unwrap_or_default().to_string())
        .collect();
    Ok(Inspectable {
        id: fields.required_text(ctx, "id")?,
        title: fields.required_text(ctx, "title")?,
        lines,
    })
}

fn parse_hex_color(value: &str) -> Option<[u8; 4]> {
    let hex = value.strip_prefix('#')?;
    if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
        return None;
    }
    let channel = |start: usize| u8::from_str_radix(&hex[start..start + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some([channel(0)?, channel(2)?, channel(4)?, alpha])
}

pub(crate) fn read_error(chapter: &str, path: PathBuf, source: std::io::Error) -> ContentCompileError {
    ContentCompileError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read chapter file: {source}"),
        chapter: chapter.to_string(),
        file_path: path,
        location: None,
    }
}
