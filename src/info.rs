use std::path::Path;

use serde::Serialize;

use crate::config::{CONFIG_FILE, Config};
use crate::sanitizer::FrontMatterScope;
use crate::store::{DocumentStore as _, FsStore};

/// Output the blockaudit reference document for the vault at `root`.
pub fn run(root: &Path, json: bool) {
    let state = gather_state(root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

struct CurrentState {
    config: Result<Config, String>,
    config_found: bool,
    documents: Option<usize>,
}

fn gather_state(root: &Path) -> CurrentState {
    let config_found = root.join(CONFIG_FILE).exists();
    let config = Config::load(root).map_err(|e| return e.to_string());
    let documents = config
        .as_ref()
        .ok()
        .and_then(|c| return FsStore::new(root, c.clone()).list().ok())
        .map(|ids| return ids.len());

    return CurrentState {
        config,
        config_found,
        documents,
    };
}

const fn scope_name(scope: FrontMatterScope) -> &'static str {
    return match scope {
        FrontMatterScope::FirstClose => "first-close",
        FrontMatterScope::Greedy => "greedy",
    };
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# blockaudit {version}

Find block anchors nobody links to and block links that point nowhere.

## Syntax

    Some paragraph. ^key              anchor: caret + key at end of line
    [[Note#^key]]                     wiki link to an anchor
    [[Note#^key|label]]               wiki link with label
    [[#^key]]                         anchor in the same note
    [text](folder/Note.md#^key)       markdown link (percent-encoded path)

Headings, code blocks, inline code, front matter, HTML and bare URLs are
ignored. Note names match file names or front-matter `aliases`, without
case; ties go to the note closest to the linking note.

## Workflow

    blockaudit check                  Scan the vault and report (exit 0/1/2)
    blockaudit check --format json    Machine-readable report
    blockaudit check --context 40     Wider context around each defect
    blockaudit watch                  Re-check on every change

## Configuration ({CONFIG_FILE})

    include = [\"notes/\"]                # only scan these paths
    exclude = [\"notes/templates/\"]      # skip these paths
    extends = \"../{CONFIG_FILE}\"     # inherit parent config
    extensions = [\"md\"]                 # document file extensions
    context_window = 20                 # characters around each defect
    front_matter = \"greedy\"             # or \"first-close\"

Set BLOCKAUDIT_LOG=debug for detailed logs on stderr.

## Current State

"
    );
}

fn print_markdown_state(state: &CurrentState) {
    if state.config_found {
        println!("Config:     {CONFIG_FILE} (found)");
    } else {
        println!("Config:     {CONFIG_FILE} (not found, using defaults)");
    }

    match &state.config {
        Ok(config) => {
            println!("Extensions: {}", config.extensions.join(", "));
            println!("Context:    {} characters", config.context_window);
            println!("Front matter: {}", scope_name(config.front_matter));
        },
        Err(e) => println!("Config error: {e}"),
    }

    match state.documents {
        Some(n) => println!("Documents:  {n}"),
        None => println!("Documents:  (unavailable)"),
    }
}

fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Every anchor referenced, every link resolves |
| 1    | Orphan anchors found |
| 2    | Broken links found |
| 3    | Runtime error |
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    current_state: StateJson,
    exit_codes: Vec<ExitCodeInfo>,
    syntax: Vec<SyntaxInfo>,
    version: String,
}

#[derive(Serialize)]
struct SyntaxInfo {
    example: String,
    meaning: String,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson {
    config_error: Option<String>,
    config_found: bool,
    context_window: Option<usize>,
    documents: Option<usize>,
    extensions: Vec<String>,
    front_matter: Option<FrontMatterScope>,
}

fn syntax(example: &str, meaning: &str) -> SyntaxInfo {
    return SyntaxInfo {
        example: example.to_string(),
        meaning: meaning.to_string(),
    };
}

fn exit(code: u8, meaning: &str) -> ExitCodeInfo {
    return ExitCodeInfo {
        code,
        meaning: meaning.to_string(),
    };
}

fn print_json(state: &CurrentState) {
    let config = state.config.as_ref().ok();
    let info = InfoJson {
        current_state: StateJson {
            config_error: state.config.as_ref().err().cloned(),
            config_found: state.config_found,
            context_window: config.map(|c| return c.context_window),
            documents: state.documents,
            extensions: config.map(|c| return c.extensions.clone()).unwrap_or_default(),
            front_matter: config.map(|c| return c.front_matter),
        },
        exit_codes: vec![
            exit(0, "Every anchor referenced, every link resolves"),
            exit(1, "Orphan anchors found"),
            exit(2, "Broken links found"),
            exit(3, "Runtime error"),
        ],
        syntax: vec![
            syntax("text ^key", "anchor definition at end of line"),
            syntax("[[Note#^key]]", "wiki link to an anchor"),
            syntax("[[#^key]]", "link to an anchor in the same note"),
            syntax("[text](Note.md#^key)", "markdown link to an anchor"),
        ],
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
