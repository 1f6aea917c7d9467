/// Entry types defined by classic BibTeX.
pub const STANDARD_TYPES: &[&str] = &[
    "article",
    "book",
    "booklet",
    "conference",
    "inbook",
    "incollection",
    "inproceedings",
    "manual",
    "mastersthesis",
    "misc",
    "phdthesis",
    "proceedings",
    "techreport",
    "unpublished",
];

/// Macros predefined by the standard styles when `common_strings` is set.
pub const MONTH_STRINGS: &[(&str, &str)] = &[
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// Alternative field names folded onto their usual spelling when
/// `homogenize_fields` is set.
pub const FIELD_ALIASES: &[(&str, &str)] = &[
    ("authors", "author"),
    ("editors", "editor"),
    ("keyw", "keyword"),
    ("keywords", "keyword"),
    ("links", "link"),
    ("subjects", "subject"),
    ("url", "link"),
    ("urls", "link"),
];

/// Options of one parse pass. All of them are off by default, which
/// yields the fields exactly as written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParserConfig {
    /// seed the macro table with the month abbreviations (`jan`, `feb`, ...)
    pub common_strings: bool,
    /// drop entries whose type is not in [`STANDARD_TYPES`]
    pub ignore_nonstandard_types: bool,
    /// rename field aliases listed in [`FIELD_ALIASES`]
    pub homogenize_fields: bool,
}

impl ParserConfig {
    pub fn new() -> ParserConfig {
        Self::default()
    }

    pub fn common_strings(mut self, enabled: bool) -> Self {
        self.common_strings = enabled;
        self
    }

    pub fn ignore_nonstandard_types(mut self, enabled: bool) -> Self {
        self.ignore_nonstandard_types = enabled;
        self
    }

    pub fn homogenize_fields(mut self, enabled: bool) -> Self {
        self.homogenize_fields = enabled;
        self
    }

    pub(crate) fn accepts_type(&self, kind: &str) -> bool {
        !self.ignore_nonstandard_types || STANDARD_TYPES.contains(&kind)
    }

    /// Lower-cases a field name and resolves aliases if requested.
    pub(crate) fn field_name(&self, name: &str) -> String {
        let name = name.to_lowercase();
        if self.homogenize_fields {
            if let Some((_, canonical)) = FIELD_ALIASES.iter().find(|(alias, _)| *alias == name) {
                return canonical.to_string();
            }
        }
        name
    }
}
