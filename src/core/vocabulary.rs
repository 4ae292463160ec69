//! Label vocabularies and the case/diacritic-insensitive matcher built from them
//!
//! Labels and terms are both passed through [`fold_label`] before matching, so
//! `"Mathématiques"`, `"MATHEMATIQUES"` and `"mathematiques"` all hit the same
//! term, and Arabic-keyboard variants of Persian letters match their Persian
//! spelling.

use crate::error::{ReportError, ReportResult};
use regex::Regex;
use tracing::warn;

/// Built-in subject terms (English and Persian)
pub const SUBJECT_TERMS: &[&str] = &[
    // English
    "religio",
    "quran",
    "literature",
    "language",
    "english",
    "arabic",
    "persian",
    "farsi",
    "science",
    "math",
    "algebra",
    "geometry",
    "calculus",
    "statistic",
    "social",
    "art",
    "technolog",
    "physics",
    "chemistry",
    "biology",
    "history",
    "geograph",
    "sport",
    // Persian
    "دین",
    "قرآن",
    "ادبیات",
    "فارسی",
    "عربی",
    "انگلیسی",
    "زبان",
    "علوم",
    "ریاضی",
    "هندسه",
    "حسابان",
    "آمار",
    "اجتماعی",
    "هنر",
    "فناوری",
    "فیزیک",
    "شیمی",
    "زیست",
    "تاریخ",
    "جغرافیا",
    "ورزش",
];

/// Built-in class/grouping terms
pub const CLASS_TERMS: &[&str] = &[
    "class",
    "grade-level",
    "grade level",
    "group",
    "section",
    "track",
    "کلاس",
    "پایه",
    "گروه",
    "رشته",
];

/// Terms that mark a label as a name column
pub const NAME_TERMS: &[&str] = &["name", "نام"];

/// Terms that, together with a name term, mark a family-name column
pub const FAMILY_MARKERS: &[&str] = &["family", "last", "sur", "خانوادگی", "فامیل"];

/// Normalize a label for matching: lowercase, strip combining marks and Arabic
/// vowel signs, unify Arabic/Persian letter variants, collapse whitespace.
pub fn fold_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        let mapped = match c {
            // Combining diacritics, Arabic harakat, superscript alef, tatweel
            '\u{0300}'..='\u{036F}' | '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{0640}' => {
                continue
            }
            '\u{200C}' | '\u{200D}' | '_' => ' ',
            'ي' | 'ى' => 'ی',
            'ك' => 'ک',
            'ة' => 'ه',
            'أ' | 'إ' | 'ٱ' => 'ا',
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
            'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => 'i',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'o',
            'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => 'u',
            'ç' | 'Ç' => 'c',
            'ñ' | 'Ñ' => 'n',
            _ => c,
        };
        out.extend(mapped.to_lowercase());
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Substring matcher over a folded term list
#[derive(Debug, Clone)]
pub struct TermMatcher {
    pattern: Option<Regex>,
}

impl TermMatcher {
    /// Like [`TermMatcher::try_new`], but a pattern that fails to build is
    /// logged and the matcher matches nothing
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Self {
        Self::try_new(terms).unwrap_or_else(|e| {
            warn!(error = %e, "vocabulary matcher disabled");
            Self { pattern: None }
        })
    }

    pub fn try_new<S: AsRef<str>>(terms: &[S]) -> ReportResult<Self> {
        let mut folded: Vec<String> = Vec::new();
        for term in terms {
            let term = fold_label(term.as_ref());
            if !term.is_empty() && !folded.contains(&term) {
                folded.push(term);
            }
        }
        if folded.is_empty() {
            return Ok(Self { pattern: None });
        }

        // Longest first so the reported match is the most specific term
        folded.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
        let source = folded
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Self {
            pattern: Some(compile_pattern(&source)?),
        })
    }

    /// The first vocabulary term found in `label`, if any
    pub fn find(&self, label: &str) -> Option<String> {
        let folded = fold_label(label);
        self.pattern
            .as_ref()
            .and_then(|re| re.find(&folded))
            .map(|m| m.as_str().to_string())
    }

    pub fn matches(&self, label: &str) -> bool {
        self.find(label).is_some()
    }
}

fn compile_pattern(source: &str) -> ReportResult<Regex> {
    Regex::new(source).map_err(|e| ReportError::Config(format!("vocabulary pattern: {e}")))
}

/// The term lists every classification pass draws from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub subjects: Vec<String>,
    pub classes: Vec<String>,
    pub names: Vec<String>,
    pub family_markers: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        fn owned(terms: &[&str]) -> Vec<String> {
            terms.iter().map(|t| (*t).to_string()).collect()
        }
        Self {
            subjects: owned(SUBJECT_TERMS),
            classes: owned(CLASS_TERMS),
            names: owned(NAME_TERMS),
            family_markers: owned(FAMILY_MARKERS),
        }
    }
}

impl Vocabulary {
    /// A vocabulary with no terms at all
    pub fn empty() -> Self {
        Self {
            subjects: Vec::new(),
            classes: Vec::new(),
            names: Vec::new(),
            family_markers: Vec::new(),
        }
    }

    /// Build every term list's matcher once, surfacing pattern errors
    pub fn validate(&self) -> ReportResult<()> {
        for terms in [
            &self.subjects,
            &self.classes,
            &self.names,
            &self.family_markers,
        ] {
            TermMatcher::try_new(terms)?;
        }
        Ok(())
    }

    /// Append `other`'s terms after this vocabulary's, skipping duplicates
    pub fn extend(&mut self, other: &Vocabulary) {
        fn merge(into: &mut Vec<String>, from: &[String]) {
            for term in from {
                if !into.contains(term) {
                    into.push(term.clone());
                }
            }
        }
        merge(&mut self.subjects, &other.subjects);
        merge(&mut self.classes, &other.classes);
        merge(&mut self.names, &other.names);
        merge(&mut self.family_markers, &other.family_markers);
    }
}
