//! The mapping tables shared by the compiler, decompiler, and
//! validator: DSL↔JSON field names, known annotations, media format
//! whitelists, and the JSON Schema format names.

/// DSL field name → JSON field name. `info` and `ok` are context
/// sensitive and handled by the object compiler directly.
pub fn json_field_name(name: &str) -> Option<&'static str> {
    let mapped = match name {
        "v" => "protocolVersion",
        "caps" => "capabilities",
        "args" => "arguments",
        "desc" => "description",
        "mime" => "mimeType",
        "in" => "inputSchema",
        "out" => "outputSchema",
        "msgs" => "messages",
        _ => return None,
    };
    Some(mapped)
}

/// JSON field name → DSL field name. Both `clientInfo` and `serverInfo`
/// fold back to `info`; `isError` is handled by the decompiler (it
/// negates).
pub fn dsl_field_name(name: &str) -> Option<&'static str> {
    let mapped = match name {
        "protocolVersion" => "v",
        "capabilities" => "caps",
        "arguments" => "args",
        "description" => "desc",
        "mimeType" => "mime",
        "inputSchema" => "in",
        "outputSchema" => "out",
        "messages" => "msgs",
        "clientInfo" | "serverInfo" => "info",
        _ => return None,
    };
    Some(mapped)
}

/// What a known annotation may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationTarget {
    Tool,
    Resource,
    Prompt,
    Initialize,
    Any,
}

impl AnnotationTarget {
    pub fn label(&self) -> &'static str {
        match self {
            AnnotationTarget::Tool => "tool",
            AnnotationTarget::Resource => "resource",
            AnnotationTarget::Prompt => "prompt",
            AnnotationTarget::Initialize => "initialize",
            AnnotationTarget::Any => "any",
        }
    }
}

pub struct KnownAnnotation {
    /// Key inside the compiled `annotations` object.
    pub json_key: &'static str,
    pub target: AnnotationTarget,
    /// Value taken by the bare (argument-less) form.
    pub implied: Option<bool>,
}

/// The known annotation table. `@impl` is special-cased by both codecs
/// (it expands to sibling `name`/`version` keys, not an annotation).
pub fn known_annotation(name: &str) -> Option<KnownAnnotation> {
    let annotation = match name {
        "readonly" => KnownAnnotation {
            json_key: "readOnlyHint",
            target: AnnotationTarget::Tool,
            implied: Some(true),
        },
        "idempotent" => KnownAnnotation {
            json_key: "idempotentHint",
            target: AnnotationTarget::Tool,
            implied: Some(true),
        },
        "destructive" => KnownAnnotation {
            json_key: "destructiveHint",
            target: AnnotationTarget::Tool,
            implied: Some(false),
        },
        "openWorld" => KnownAnnotation {
            json_key: "openWorld",
            target: AnnotationTarget::Tool,
            implied: Some(true),
        },
        "priority" => KnownAnnotation {
            json_key: "priority",
            target: AnnotationTarget::Resource,
            implied: None,
        },
        "audience" => KnownAnnotation {
            json_key: "audience",
            target: AnnotationTarget::Resource,
            implied: None,
        },
        _ => return None,
    };
    Some(annotation)
}

/// Compiled annotation key → DSL annotation name.
pub fn dsl_annotation_name(json_key: &str) -> Option<&'static str> {
    let name = match json_key {
        "readOnlyHint" => "readonly",
        "idempotentHint" => "idempotent",
        "destructiveHint" => "destructive",
        "openWorld" => "openWorld",
        "priority" => "priority",
        "audience" => "audience",
        _ => return None,
    };
    Some(name)
}

pub const IMAGE_FORMATS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg", "tiff"];

pub const AUDIO_FORMATS: &[&str] = &["wav", "mp3", "ogg", "flac", "aac", "opus", "m4a", "webm"];

/// Standard JSON-RPC error codes live in this closed range.
pub const STANDARD_ERROR_RANGE: (i64, i64) = (-32768, -32000);

pub fn mime_for_image(format: &str) -> String {
    match format {
        "jpg" => "image/jpeg".to_string(),
        "svg" => "image/svg+xml".to_string(),
        other => format!("image/{}", other),
    }
}

pub fn mime_for_audio(format: &str) -> String {
    format!("audio/{}", format)
}

/// Extract the subtype from a `image/png`-style mime string.
pub fn format_from_mime(mime: &str) -> Option<&str> {
    mime.split_once('/').map(|(_, subtype)| subtype)
}

/// JSON Schema `format` names a cast may map onto; anything else is
/// retained as a custom annotation on the schema.
pub const JSON_SCHEMA_FORMATS: &[&str] = &[
    "date-time",
    "date",
    "time",
    "duration",
    "email",
    "idn-email",
    "hostname",
    "idn-hostname",
    "ipv4",
    "ipv6",
    "uri",
    "uri-reference",
    "uri-template",
    "uuid",
    "regex",
    "json-pointer",
    "relative-json-pointer",
];

pub fn is_schema_format(name: &str) -> bool {
    JSON_SCHEMA_FORMATS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_mapping_is_inverse() {
        for dsl in ["v", "caps", "args", "desc", "mime", "in", "out", "msgs"] {
            let json = json_field_name(dsl).unwrap();
            assert_eq!(dsl_field_name(json), Some(dsl));
        }
    }

    #[test]
    fn test_info_folds_both_ways() {
        assert_eq!(dsl_field_name("clientInfo"), Some("info"));
        assert_eq!(dsl_field_name("serverInfo"), Some("info"));
    }

    #[test]
    fn test_known_annotations_reverse() {
        for name in ["readonly", "idempotent", "destructive", "openWorld", "priority"] {
            let known = known_annotation(name).unwrap();
            assert_eq!(dsl_annotation_name(known.json_key), Some(name));
        }
    }

    #[test]
    fn test_mime_round_trip() {
        assert_eq!(mime_for_image("png"), "image/png");
        assert_eq!(mime_for_image("jpg"), "image/jpeg");
        assert_eq!(format_from_mime("image/png"), Some("png"));
        assert_eq!(format_from_mime("audio/wav"), Some("wav"));
    }
}
