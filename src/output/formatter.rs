//! Output formatters for ranked batches

use crate::config::OutputFormat;
use crate::error::{RankerError, Result};
use crate::processing::ranker::{BatchReport, RankedResult};
use colored::{Color, Colorize};
use serde::Serialize;
use std::path::Path;

/// Trait for rendering a ranked batch
pub trait OutputFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors
pub struct ConsoleFormatter {
    use_colors: bool,
    show_omitted: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
    show_omitted: bool,
}

/// One row per ranked resume, list fields joined with "; "
pub struct CsvFormatter;

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    csv_formatter: CsvFormatter,
}

fn score_color(score: f32) -> Color {
    match score {
        s if s >= 8.0 => Color::Green,
        s if s >= 6.0 => Color::BrightGreen,
        s if s >= 4.0 => Color::Yellow,
        _ => Color::Red,
    }
}

fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, show_omitted: bool) -> Self {
        Self {
            use_colors,
            show_omitted,
        }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "█".color(Color::Blue).bold(), title.color(Color::Blue).bold())
        } else {
            format!("\n█ {}\n", title)
        }
    }

    fn format_score(&self, score: f32) -> String {
        let text = format!("{:.2}/10", score);
        if self.use_colors {
            text.color(score_color(score)).bold().to_string()
        } else {
            text
        }
    }

    fn format_result(&self, rank: usize, result: &RankedResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n#{} {} {}  {}\n",
            rank,
            self.colorize(&result.name, Color::Cyan),
            self.format_score(result.match_score),
            self.colorize(&display_name(&result.file_path), Color::BrightBlack)
        ));

        if let Some(email) = &result.email {
            output.push_str(&format!("   Email:          {}\n", email));
        }
        if !result.phone_numbers.is_empty() {
            output.push_str(&format!("   Phone:          {}\n", result.phone_numbers.join(", ")));
        }
        output.push_str(&format!(
            "   Experience:     {} years ({})\n",
            result.experience_years, result.experience_level
        ));
        output.push_str(&format!("   Education:      {}\n", result.education));
        output.push_str(&format!("   Domain:         {}\n", result.domain));
        output.push_str(&format!("   Skills:         {}\n", join_or_dash(&result.skills)));
        if !result.certifications.is_empty() {
            output.push_str(&format!("   Certifications: {}\n", result.certifications.join(" | ")));
        }
        output.push_str(&format!("   Projects:       {}\n", result.project_count));
        output.push_str(&format!(
            "   Similarity:     {:.2}/10 | Skill overlap: {:.0}%\n",
            result.semantic_similarity,
            result.skill_overlap * 100.0
        ));
        output.push_str(&format!("   {}\n", result.explanation));

        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME RANKING"));
        output.push_str(&format!(
            "Ranked {} of {} documents | Processing time: {}ms\n",
            report.results.len(),
            report.total_documents,
            report.processing_time_ms
        ));

        if report.results.is_empty() {
            output.push_str(&format!(
                "\n{}\n",
                self.colorize("No relevant resumes found.", Color::Yellow)
            ));
        }

        for (i, result) in report.results.iter().enumerate() {
            output.push_str(&self.format_result(i + 1, result));
        }

        if self.show_omitted && !report.omitted.is_empty() {
            output.push_str(&self.format_header("Omitted"));
            for omitted in &report.omitted {
                output.push_str(&format!(
                    "   {} {}\n",
                    self.colorize(&display_name(&omitted.file_path), Color::BrightBlack),
                    omitted.reason
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool, show_omitted: bool) -> Self {
        Self {
            include_metadata,
            show_omitted,
        }
    }

    /// Pipes would break the table layout
    fn cell(text: &str) -> String {
        text.replace('|', "\\|")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Resume Ranking\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms | **Ranked:** {} of {}\n\n",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
                report.processing_time_ms,
                report.results.len(),
                report.total_documents
            ));
        }

        if report.results.is_empty() {
            output.push_str("_No relevant resumes found._\n");
        } else {
            output.push_str("| Rank | Name | Score | Similarity | Skill Overlap | Experience | Education | Domain |\n");
            output.push_str("|------|------|-------|------------|---------------|------------|-----------|--------|\n");
            for (i, r) in report.results.iter().enumerate() {
                output.push_str(&format!(
                    "| {} | {} | {:.2} | {:.2} | {:.0}% | {} yrs ({}) | {} | {} |\n",
                    i + 1,
                    Self::cell(&r.name),
                    r.match_score,
                    r.semantic_similarity,
                    r.skill_overlap * 100.0,
                    r.experience_years,
                    r.experience_level,
                    Self::cell(&r.education),
                    Self::cell(&r.domain)
                ));
            }

            output.push_str("\n## Candidates\n");
            for (i, r) in report.results.iter().enumerate() {
                output.push_str(&format!("\n### {}. {}\n\n", i + 1, r.name));
                output.push_str(&format!("- **File:** `{}`\n", r.file_path));
                if let Some(email) = &r.email {
                    output.push_str(&format!("- **Email:** {}\n", email));
                }
                if !r.phone_numbers.is_empty() {
                    output.push_str(&format!("- **Phone:** {}\n", r.phone_numbers.join(", ")));
                }
                output.push_str(&format!("- **Skills:** {}\n", join_or_dash(&r.skills)));
                if !r.certifications.is_empty() {
                    output.push_str(&format!("- **Certifications:** {}\n", r.certifications.join("; ")));
                }
                output.push_str(&format!("- **Projects:** {}\n", r.project_count));
                output.push_str(&format!("\n> {}\n", r.explanation));
            }
        }

        if self.show_omitted && !report.omitted.is_empty() {
            output.push_str("\n## Omitted\n\n");
            for omitted in &report.omitted {
                output.push_str(&format!("- `{}`: {}\n", omitted.file_path, omitted.reason));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

// Same order as the fields of `CsvRow`
const CSV_HEADER: &[&str] = &[
    "rank",
    "file_path",
    "name",
    "email",
    "phone_numbers",
    "match_score",
    "semantic_similarity",
    "skill_overlap",
    "experience_years",
    "experience_level",
    "education",
    "domain",
    "skills",
    "certifications",
    "project_count",
    "explanation",
];

#[derive(Serialize)]
struct CsvRow<'a> {
    rank: usize,
    file_path: &'a str,
    name: &'a str,
    email: &'a str,
    phone_numbers: String,
    match_score: f32,
    semantic_similarity: f32,
    skill_overlap: f32,
    experience_years: f64,
    experience_level: String,
    education: &'a str,
    domain: &'a str,
    skills: String,
    certifications: String,
    project_count: usize,
    explanation: &'a str,
}

impl OutputFormatter for CsvFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        // Header written by hand so an empty ranking still gets one
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer
            .write_record(CSV_HEADER)
            .map_err(|e| RankerError::OutputFormatting(format!("CSV header: {}", e)))?;

        for (i, r) in report.results.iter().enumerate() {
            writer
                .serialize(CsvRow {
                    rank: i + 1,
                    file_path: &r.file_path,
                    name: &r.name,
                    email: r.email.as_deref().unwrap_or(""),
                    phone_numbers: r.phone_numbers.join("; "),
                    match_score: r.match_score,
                    semantic_similarity: r.semantic_similarity,
                    skill_overlap: r.skill_overlap,
                    experience_years: r.experience_years,
                    experience_level: r.experience_level.to_string(),
                    education: &r.education,
                    domain: &r.domain,
                    skills: r.skills.join("; "),
                    certifications: r.certifications.join("; "),
                    project_count: r.project_count,
                    explanation: &r.explanation,
                })
                .map_err(|e| RankerError::OutputFormatting(format!("CSV row: {}", e)))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| RankerError::OutputFormatting(format!("CSV flush: {}", e)))?;

        String::from_utf8(bytes).map_err(|e| RankerError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Csv
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true)
    }

    pub fn with_options(
        use_colors: bool,
        show_omitted: bool,
        pretty_json: bool,
        include_metadata: bool,
    ) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, show_omitted),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata, show_omitted),
            csv_formatter: CsvFormatter,
        }
    }

    pub fn generate_report(&self, report: &BatchReport, format: &OutputFormat) -> Result<String> {
        let formatters: [&dyn OutputFormatter; 4] = [
            &self.console_formatter,
            &self.json_formatter,
            &self.markdown_formatter,
            &self.csv_formatter,
        ];

        formatters
            .iter()
            .find(|f| f.supports_format() == *format)
            .ok_or_else(|| RankerError::OutputFormatting(format!("No formatter for {:?}", format)))?
            .format_report(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, timestamp: bool) -> String {
    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("ranking{}.txt", timestamp_suffix),
        OutputFormat::Json => format!("ranking{}.json", timestamp_suffix),
        OutputFormat::Markdown => format!("ranking{}.md", timestamp_suffix),
        OutputFormat::Csv => format!("ranking{}.csv", timestamp_suffix),
    }
}
