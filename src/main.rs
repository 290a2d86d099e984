//! zonal - page zone segmentation and article-content extraction

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use zonal::label::content::ContentLabeler;
use zonal::label::tag::label_by_tag;
use zonal::label::{PunctuationSentences, WhitespaceTokenizer, ARTICLE_CONTENT, PARAGRAPH};
use zonal::{PageText, VocabularyRules, ZoneKind, ZoneTree, ZoneTreeBuilder};

#[derive(Parser)]
#[command(name = "zonal")]
#[command(version, about = "Segment a captured page into zones", long_about = None)]
#[command(after_help = "EXAMPLES:
    zonal page.xml --text page.txt -o zones.xml      Build the zone tree
    zonal page.xml --text page.txt --label --summary Score zones and print stats
    zonal page.xml --text page.txt --tag article     Label by semantic tag")]
struct Cli {
    /// Serialized classified element tree (XML)
    #[arg(value_name = "INPUT")]
    input: String,

    /// File holding the shared page text the element spans point into
    #[arg(long, value_name = "FILE")]
    text: String,

    /// File holding the shared page markup, if available
    #[arg(long, value_name = "FILE")]
    html: Option<String>,

    /// Write the zone tree XML here
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Score zones and label article content (column grouping is not
    /// available from the CLI, so scoring stops at zone fractions)
    #[arg(long)]
    label: bool,

    /// Label zones containing this tag as article content
    #[arg(long, value_name = "TAG")]
    tag: Option<String>,

    /// Print a JSON summary of the built zones
    #[arg(long)]
    summary: bool,
}

#[derive(Serialize)]
struct Summary {
    zones: usize,
    inline: usize,
    linebreak: usize,
    paragraphs: usize,
    article_content: usize,
    root_score: Option<i64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let xml = fs::read_to_string(&cli.input).map_err(|e| e.to_string())?;
    let elements = zonal::xml::read_element_tree(&xml).map_err(|e| e.to_string())?;

    let page = PageText {
        html: match &cli.html {
            Some(path) => fs::read_to_string(path).map_err(|e| e.to_string())?,
            None => String::new(),
        },
        text: fs::read_to_string(&cli.text).map_err(|e| e.to_string())?,
    };

    let rules = VocabularyRules::default();
    let mut zones = ZoneTreeBuilder::new(&rules)
        .build(&elements, &page)
        .map_err(|e| e.to_string())?;

    let mut root_score = None;
    if cli.label {
        let tokenizer = WhitespaceTokenizer;
        let detector = PunctuationSentences;
        let labeler = ContentLabeler::new(&tokenizer, &detector);
        let total = labeler.execute_zones(&mut zones).map_err(|e| e.to_string())?;
        root_score = Some(total);
    }
    if let Some(tag) = &cli.tag {
        label_by_tag(&mut zones, &elements, tag).map_err(|e| e.to_string())?;
    }

    if let Some(output) = &cli.output {
        fs::write(output, zonal::xml::write_zone_tree(&zones)).map_err(|e| e.to_string())?;
    }

    if cli.summary {
        let summary = summarize(&zones, root_score).map_err(|e| e.to_string())?;
        let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{json}");
    }
    Ok(())
}

fn summarize(zones: &ZoneTree, root_score: Option<i64>) -> zonal::Result<Summary> {
    let root = zones.root_id()?;
    let mut summary = Summary {
        zones: 0,
        inline: 0,
        linebreak: 0,
        paragraphs: 0,
        article_content: 0,
        root_score,
    };
    for id in zones.descendants_and_self(root)? {
        let node = zones.require(id)?;
        summary.zones += 1;
        match node.payload.kind {
            ZoneKind::Inline => summary.inline += 1,
            ZoneKind::Linebreak => summary.linebreak += 1,
            ZoneKind::Unknown => {}
        }
        if node.classes.has(PARAGRAPH) {
            summary.paragraphs += 1;
        }
        if node.classes.has(ARTICLE_CONTENT) {
            summary.article_content += 1;
        }
    }
    Ok(summary)
}
