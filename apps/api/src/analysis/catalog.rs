//! The analysis catalog: one table row per `AnalysisKind`, holding everything
//! the service knows about that kind (display title, description, prompt
//! template and the static guidance shown when the LLM is unavailable).

use serde::{Deserialize, Serialize};

/// The five analyses a user can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Overview,
    Issues,
    Tips,
    Matching,
    Complete,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::Overview,
        AnalysisKind::Issues,
        AnalysisKind::Tips,
        AnalysisKind::Matching,
        AnalysisKind::Complete,
    ];

    /// Sub-analyses run, in this order, by `Complete`.
    pub const COMPLETE_STEPS: [AnalysisKind; 4] = [
        AnalysisKind::Overview,
        AnalysisKind::Issues,
        AnalysisKind::Tips,
        AnalysisKind::Matching,
    ];

    pub fn entry(self) -> &'static CatalogEntry {
        let entry = &CATALOG[self as usize];
        debug_assert_eq!(entry.kind, self, "catalog row out of order");
        entry
    }

    pub fn title(self) -> &'static str {
        self.entry().title
    }

    pub fn slug(self) -> &'static str {
        self.entry().slug
    }

    /// Accepts either the slug (`"matching"`) or the display title (`"Job Matching"`).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|kind| {
            kind.slug().eq_ignore_ascii_case(value) || kind.title().eq_ignore_ascii_case(value)
        })
    }

    /// Download name of the PDF report for this kind.
    pub fn report_filename(self) -> String {
        let stem = self.title().to_lowercase().replace(' ', "_");
        match self {
            AnalysisKind::Complete => format!("resume_analysis_report_{stem}.pdf"),
            _ => format!("resume_analysis_{stem}.pdf"),
        }
    }
}

pub struct CatalogEntry {
    pub kind: AnalysisKind,
    pub title: &'static str,
    pub slug: &'static str,
    pub description: &'static str,
    pub prompt: &'static str,
    pub fallback: &'static str,
}

// Row order must match the `AnalysisKind` discriminants.
static CATALOG: [CatalogEntry; 5] = [
    CatalogEntry {
        kind: AnalysisKind::Overview,
        title: "Quick Overview",
        slug: "overview",
        description: "Get a rapid summary of the resume's key strengths and areas",
        prompt: "Provide a comprehensive overview of this resume including key strengths and notable areas for improvement.\n\
                 Focus on the candidate's experience, skills, and overall presentation.",
        fallback: "Your resume has been uploaded and processed successfully.\n\
                   Here are some general guidelines to review:\n\
                   - Your contact information is prominent and current.\n\
                   - Your experience is listed in reverse chronological order.\n\
                   - Your skills section matches the job requirements.\n\
                   - Look for quantifiable achievements and results.",
    },
    CatalogEntry {
        kind: AnalysisKind::Issues,
        title: "Issues Analysis",
        slug: "issues",
        description: "Identify specific weaknesses and improvement areas",
        prompt: "Analyze this resume and identify specific issues, weaknesses, and areas that need improvement.\n\
                 For each issue identified, mark it with [WEAKNESS] and provide specific suggestions for enhancement.",
        fallback: "Common resume issues to check manually:\n\
                   - Formatting problems: Inconsistent fonts, sizes, or spacing.\n\
                   - Content issues: Typos, vague job descriptions, missing achievements.\n\
                   - Structure problems: No clear summary, poor organization.",
    },
    CatalogEntry {
        kind: AnalysisKind::Tips,
        title: "Enhancement Tips",
        slug: "tips",
        description: "Get actionable tips to improve the resume",
        prompt: "Provide specific, actionable tips to enhance this resume.\n\
                 Mark positive aspects with [STRENGTH] and improvement suggestions with [WEAKNESS].\n\
                 Include formatting, content, and presentation recommendations.",
        fallback: "Focus on these improvement areas:\n\
                   - Add quantifiable achievements.\n\
                   - Use action verbs to start bullet points.\n\
                   - Customize your resume for each job application.\n\
                   - Include relevant keywords from the job posting.",
    },
    CatalogEntry {
        kind: AnalysisKind::Matching,
        title: "Job Matching",
        slug: "matching",
        description: "Analyze how well the resume matches the job requirements",
        prompt: "Compare this resume against the job description and analyze the match.\n\
                 Mark matching qualifications with [STRENGTH] and gaps with [WEAKNESS].\n\
                 Provide a match percentage and specific recommendations.",
        fallback: "To manually assess job matching:\n\
                   - Compare your resume against the job posting.\n\
                   - Highlight matching skills and experience.\n\
                   - Identify gaps: Missing technical skills, lack of industry experience.",
    },
    CatalogEntry {
        kind: AnalysisKind::Complete,
        title: "Complete Analysis",
        slug: "complete",
        description: "Comprehensive analysis covering all aspects",
        prompt: "Provide a complete analysis of this resume, covering all aspects including strengths, weaknesses, and job matching.",
        fallback: "Work through a full manual review:\n\
                   - Check that contact details, summary, experience, education and skills are all present.\n\
                   - Fix formatting inconsistencies, typos and vague descriptions.\n\
                   - Rewrite bullet points around action verbs and measurable results.\n\
                   - Compare every requirement in the job posting against your resume and close the gaps.",
    },
];
