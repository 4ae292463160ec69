use crate::config::load_vocabulary;
use crate::core::{Analysis, AnalysisWarning, Analyzer, Classifier, Scope};
use crate::error::ReportResult;
use crate::excel::{ReportExporter, Workbook};
use crate::types::{format_number, ColumnRole, RoleAssignment, RoleSlot};
use crate::writer::export_csv_dir;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Output format of the analyze command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Options shared by every command that analyses one sheet
#[derive(Debug, Clone, Default)]
pub struct SheetOptions {
    pub sheet: Option<String>,
    pub vocabulary: Option<PathBuf>,
}

/// Open `file`, load the selected sheet (first by default) and classify it
fn open_analyzer(file: &Path, options: &SheetOptions) -> ReportResult<Analyzer> {
    let vocabulary = load_vocabulary(options.vocabulary.as_deref())?;
    let classifier = Classifier::new(&vocabulary);

    let workbook = Workbook::open(file)?;
    let raw = match &options.sheet {
        Some(name) => workbook.load_sheet(name)?,
        None => workbook.load_first_sheet()?,
    };
    Analyzer::new(raw, &classifier)
}

fn slot_text(slot: RoleSlot, roles: &RoleAssignment) -> String {
    match slot {
        RoleSlot::Unassigned => "-".dimmed().to_string(),
        RoleSlot::Assigned { detection, .. } => format!(
            "{} ({})",
            roles.label_of(slot).unwrap_or_default().bright_blue(),
            detection
        ),
    }
}

fn optional_number(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), format_number)
}

/// Execute the sheets command
pub fn sheets(file: PathBuf) -> ReportResult<()> {
    println!("{}", "📒 ReportCard - Sheets".bold().green());
    println!("   File: {}\n", file.display());

    let workbook = Workbook::open(&file)?;
    for name in workbook.sheet_names() {
        match workbook.load_sheet(name) {
            Ok(table) => println!(
                "   {} {:<24} {} rows, {} columns",
                "✅",
                name.bright_blue().bold(),
                table.row_count(),
                table.column_count()
            ),
            Err(e) => println!("   {} {:<24} {}", "❌", name.bright_blue().bold(), e.to_string().red()),
        }
    }
    println!();
    Ok(())
}

/// Execute the classify command
pub fn classify(file: PathBuf, options: SheetOptions) -> ReportResult<()> {
    println!("{}", "🔎 ReportCard - Column Roles".bold().green());
    println!("   File: {}", file.display());

    let analyzer = open_analyzer(&file, &options)?;
    let roles = analyzer.roles();
    println!("   Sheet: {}\n", analyzer.raw().sheet.bright_yellow());

    println!("{:<28} {:<14}", "Column".bold(), "Role".bold());
    println!("{}", "─".repeat(42));
    for (label, role) in roles.roles() {
        let role_text = match role {
            ColumnRole::Subject => role.to_string().green(),
            ColumnRole::Unclassified => role.to_string().dimmed(),
            _ => role.to_string().cyan(),
        };
        println!("{:<28} {:<14}", label, role_text);
    }
    println!("{}", "─".repeat(42));

    println!(
        "\n   Subjects: {} via {} ({})",
        roles.subjects.len(),
        roles.subject_rule.bright_blue(),
        roles.subject_detection
    );
    println!("   Class:    {}", slot_text(roles.class, roles));
    println!("   Name:     {}", slot_text(roles.given_name, roles));
    println!("   Family:   {}", slot_text(roles.family_name, roles));

    let classes = analyzer.class_labels();
    if !classes.is_empty() {
        println!("   Classes:  {}", classes.join(", ").bright_yellow());
    }
    println!();
    Ok(())
}

/// Execute the analyze command
pub fn analyze(
    file: PathBuf,
    options: SheetOptions,
    class: Option<String>,
    top: usize,
    format: OutputFormat,
) -> ReportResult<()> {
    let analyzer = open_analyzer(&file, &options)?;
    let analysis = analyzer.analyze(&Scope::from_selection(class.as_deref()));

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        OutputFormat::Text => {
            println!("{}", "📊 ReportCard - Analysis".bold().green());
            println!("   File:  {}", file.display());
            println!("   Sheet: {}", analysis.sheet.bright_yellow());
            println!("   Scope: {}", analysis.scope.to_string().bright_yellow());

            print_warnings(&analysis, &analyzer);
            if analysis.is_empty() {
                return Ok(());
            }
            print_overview(&analysis);
            print_subject_stats(&analysis);
            print_group_stats(&analysis);
            print_ranking(&analysis, top);
        }
    }
    Ok(())
}

fn print_warnings(analysis: &Analysis, analyzer: &Analyzer) {
    for warning in &analysis.warnings {
        match warning {
            AnalysisWarning::RowsDropped { count } => println!(
                "   {}",
                format!("⚠️  {count} rows without any score were skipped").yellow()
            ),
            AnalysisWarning::EmptyScope { scope } => {
                println!("\n{}", format!("ℹ️  No students in {scope}").yellow());
                let classes = analyzer.class_labels();
                if !classes.is_empty() {
                    println!("   Available classes: {}", classes.join(", "));
                }
            }
        }
    }
}

fn print_overview(analysis: &Analysis) {
    let o = &analysis.overview;
    println!("\n{}", "📋 Overview:".bold().cyan());
    println!("   Students:        {}", o.students);
    println!("   Subjects:        {}", o.subjects);
    println!("   Classes:         {}", o.classes);
    println!("   Mean average:    {}", optional_number(o.mean_average).bold());
    println!("   Highest average: {}", optional_number(o.highest_average).green());
    println!("   Lowest average:  {}", optional_number(o.lowest_average).red());
}

fn print_subject_stats(analysis: &Analysis) {
    println!("\n{}", "📚 Subjects (highest mean first):".bold().cyan());
    println!("{}", "─".repeat(72));
    println!(
        "{:<20} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Subject".bold(),
        "Mean".bold(),
        "Max".bold(),
        "Min".bold(),
        "StdDev".bold(),
        "Count".bold()
    );
    println!("{}", "─".repeat(72));
    for s in &analysis.subject_stats {
        println!(
            "{:<20} {:>8.2} {:>8} {:>8} {:>8} {:>8}",
            s.label.bright_blue(),
            s.mean,
            format_number(s.max),
            format_number(s.min),
            s.std_dev.to_string(),
            s.count
        );
    }
    println!("{}", "─".repeat(72));
}

fn print_group_stats(analysis: &Analysis) {
    let Some(groups) = &analysis.group_stats else {
        return;
    };
    if groups.is_empty() {
        return;
    }

    println!("\n{}", "🏫 Classes:".bold().cyan());
    println!("{}", "─".repeat(80));
    println!(
        "{:<16} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Class".bold(),
        "Count".bold(),
        "Mean".bold(),
        "StdDev".bold(),
        "Min".bold(),
        "Median".bold(),
        "Max".bold()
    );
    println!("{}", "─".repeat(80));
    for g in groups {
        println!(
            "{:<16} {:>8} {:>8.2} {:>8} {:>8} {:>8} {:>8}",
            g.class_label.bright_blue(),
            g.count,
            g.mean,
            g.std_dev.to_string(),
            format_number(g.min),
            format_number(g.median),
            format_number(g.max)
        );
    }
    println!("{}", "─".repeat(80));
}

/// `top == 0` prints every student
fn print_ranking(analysis: &Analysis, top: usize) {
    let shown = if top == 0 {
        analysis.ranking.len()
    } else {
        top.min(analysis.ranking.len())
    };

    println!("\n{}", "🏆 Ranking:".bold().cyan());
    for r in analysis.ranking.iter().take(shown) {
        let medal = match r.rank {
            1 => "🥇",
            2 => "🥈",
            3 => "🥉",
            _ => "  ",
        };
        println!(
            "   {} {:>4}. {:<30} {}",
            medal,
            r.rank,
            r.display_name,
            format_number(r.row.average).bold()
        );
    }
    if shown < analysis.ranking.len() {
        println!(
            "   {}",
            format!("… {} more (use --top 0 to show all)", analysis.ranking.len() - shown).dimmed()
        );
    }
    println!();
}

/// Execute the export command
pub fn export(
    file: PathBuf,
    output: PathBuf,
    options: SheetOptions,
    class: Option<String>,
) -> ReportResult<()> {
    println!("{}", "🔥 ReportCard - Export".bold().green());
    println!("   Input:  {}", file.display());
    println!("   Output: {}\n", output.display());

    let analyzer = open_analyzer(&file, &options)?;
    let analysis = analyzer.analyze(&Scope::from_selection(class.as_deref()));
    if analysis.is_empty() {
        println!("{}", format!("ℹ️  No students in {}", analysis.scope).yellow());
    }

    let is_xlsx = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));

    if is_xlsx {
        ReportExporter::new(&analysis).export(&output)?;
        println!("{}", "✅ Report workbook written".bold().green());
        println!("   Excel file: {}\n", output.display());
    } else {
        let written = export_csv_dir(&analysis, &output)?;
        println!("{}", "✅ CSV export complete".bold().green());
        for path in written {
            println!("   📄 {}", path.display());
        }
        println!();
    }
    Ok(())
}
