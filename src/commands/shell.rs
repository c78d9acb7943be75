//! Interactive shell
//!
//! Reads lines from stdin while the poll timer runs in the background. Plain
//! input is a question; lines starting with `/` are commands. While a delete
//! confirmation is pending the next line answers it.

use super::list::print_document_rows;
use crate::api::DocumentApi;
use crate::app::{App, AppEvent, AppOptions};
use crate::confirm::{delete_question, is_affirmative};
use crate::documents::lookup_reference;
use crate::error::Result;
use crate::models::{ChatMessage, Selection};
use crate::preview::PreviewState;
use crate::progress;
use crate::upload::{UploadStatus, SUPPORTED_TYPES_HINT, UPLOADING_MESSAGE};
use crossterm::style::Stylize;
use std::future::Future;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

const HELP: &str = "\
Commands:
  /list               Show documents
  /select <n|id>      Ask questions about one ready document
  /all                Ask questions about all documents
  /upload <path>      Upload a document
  /delete <n|id>      Delete a document
  /preview            Show the preview of the selected document
  /refresh            Reload the document list
  /help               Show this help
  /quit               Exit
Anything else is sent as a question.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// A parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellInput<'a> {
    Empty,
    Question(&'a str),
    List,
    Select(&'a str),
    All,
    Upload(&'a str),
    Delete(&'a str),
    Preview,
    Refresh,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_line(line: &str) -> ShellInput<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ShellInput::Empty;
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return ShellInput::Question(line.trim_end_matches(['\r', '\n']));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match name {
        "list" | "ls" => ShellInput::List,
        "select" | "use" if !arg.is_empty() => ShellInput::Select(arg),
        "all" => ShellInput::All,
        "upload" => ShellInput::Upload(arg),
        "delete" | "rm" if !arg.is_empty() => ShellInput::Delete(arg),
        "preview" => ShellInput::Preview,
        "refresh" => ShellInput::Refresh,
        "help" | "?" => ShellInput::Help,
        "quit" | "exit" | "q" => ShellInput::Quit,
        _ => ShellInput::Unknown(name),
    }
}

/// Run the shell until `/quit`, end of input or Ctrl-C
pub async fn cmd_shell<A: DocumentApi>(api: A, options: AppOptions, endpoint: &str) -> Result<()> {
    let (mut app, events) = App::new(api, options);
    println!("📚 docqa connected to {}", endpoint);
    println!("Type /help for commands.\n");

    let spinner = progress::spinner("Loading documents...");
    app.start().await;
    spinner.finish_and_clear();
    show_documents(&app);
    print_scope(&app);

    let lines = BufReader::new(tokio::io::stdin()).lines();
    run_session(&mut app, events, lines, tokio::signal::ctrl_c()).await
}

/// Drive the loop, then release the poll timer and preview however it ended.
async fn run_session<A, R, F>(
    app: &mut App<A>,
    events: UnboundedReceiver<AppEvent>,
    lines: Lines<R>,
    interrupt: F,
) -> Result<()>
where
    A: DocumentApi,
    R: AsyncBufRead + Unpin,
    F: Future,
{
    let result = run_loop(app, events, lines, interrupt).await;
    app.shutdown();
    result
}

async fn run_loop<A, R, F>(
    app: &mut App<A>,
    mut events: UnboundedReceiver<AppEvent>,
    mut lines: Lines<R>,
    interrupt: F,
) -> Result<()>
where
    A: DocumentApi,
    R: AsyncBufRead + Unpin,
    F: Future,
{
    tokio::pin!(interrupt);
    print_prompt(app)?;

    loop {
        tokio::select! {
            _ = &mut interrupt => {
                debug!("Received Ctrl+C, leaving shell");
                println!();
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!();
                    break;
                };
                if handle_line(app, &line).await == Flow::Quit {
                    break;
                }
                print_prompt(app)?;
            }
            Some(event) = events.recv() => {
                let before = status_snapshot(app);
                app.handle_event(event).await;
                if status_snapshot(app) != before {
                    println!();
                    show_documents(app);
                    print_prompt(app)?;
                }
            }
        }
    }
    Ok(())
}

fn status_snapshot<A: DocumentApi>(app: &App<A>) -> Vec<(String, String)> {
    app.registry()
        .documents()
        .iter()
        .map(|d| (d.doc_id.clone(), d.status.clone()))
        .collect()
}

async fn handle_line<A: DocumentApi>(app: &mut App<A>, line: &str) -> Flow {
    if app.is_confirming_delete() {
        answer_delete(app, line).await;
        return Flow::Continue;
    }

    match parse_line(line) {
        ShellInput::Empty => {}
        ShellInput::Question(question) => ask(app, question).await,
        ShellInput::List => show_documents(app),
        ShellInput::Select(reference) => select(app, reference).await,
        ShellInput::All => {
            if app.clear_selection().await {
                print_scope(app);
            }
        }
        ShellInput::Upload(path) => upload(app, path).await,
        ShellInput::Delete(reference) => request_delete(app, reference),
        ShellInput::Preview => print_preview(app),
        ShellInput::Refresh => {
            let spinner = progress::spinner("Loading documents...");
            app.refresh().await;
            spinner.finish_and_clear();
            show_documents(app);
        }
        ShellInput::Help => println!("{}", HELP),
        ShellInput::Quit => return Flow::Quit,
        ShellInput::Unknown(name) => {
            println!("Unknown command: /{}. Type /help for commands.", name)
        }
    }
    Flow::Continue
}

async fn ask<A: DocumentApi>(app: &mut App<A>, question: &str) {
    if !app.chat().can_submit(question) {
        return;
    }
    let spinner = progress::spinner("Thinking...");
    let reply = app.ask(question).await;
    spinner.finish_and_clear();
    if let Some(reply) = reply {
        print_reply(&reply);
    }
}

async fn select<A: DocumentApi>(app: &mut App<A>, reference: &str) {
    let target = match lookup_reference(app.registry(), reference) {
        Ok(target) => target.map(str::to_string),
        Err(e) => {
            println!("{} {}", "⚠".yellow(), e);
            return;
        }
    };

    let spinner = progress::spinner("Loading preview...");
    let changed = app.select(target.as_deref()).await;
    spinner.finish_and_clear();

    match changed {
        Ok(true) => {
            print_scope(app);
            print_preview(app);
        }
        Ok(false) => print_scope(app),
        Err(e) => println!("{} {}", "⚠".yellow(), e),
    }
}

async fn upload<A: DocumentApi>(app: &mut App<A>, path: &str) {
    if !path.is_empty() {
        app.choose_upload_file(path);
    }
    let spinner = progress::spinner(UPLOADING_MESSAGE);
    let uploaded = app.submit_upload().await;
    spinner.finish_and_clear();

    let form = app.upload();
    match form.status() {
        UploadStatus::Success => println!("{} {}", "✓".green(), form.message()),
        UploadStatus::Error => {
            println!("{} {}", "✗".red(), form.message());
            println!("  {}", SUPPORTED_TYPES_HINT.dim());
        }
        UploadStatus::Idle | UploadStatus::Uploading => {}
    }
    if uploaded.is_some() {
        show_documents(app);
    }
}

fn request_delete<A: DocumentApi>(app: &mut App<A>, reference: &str) {
    let doc_id = match lookup_reference(app.registry(), reference) {
        Ok(Some(doc_id)) => doc_id.to_string(),
        Ok(None) => {
            println!("{} Pick a document to delete, not All Documents.", "⚠".yellow());
            return;
        }
        Err(e) => {
            println!("{} {}", "⚠".yellow(), e);
            return;
        }
    };

    match app.request_delete(&doc_id) {
        Ok(doc) => println!("{} [y/N]", delete_question(&doc.filename)),
        Err(e) => println!("{} {}", "⚠".yellow(), e),
    }
}

async fn answer_delete<A: DocumentApi>(app: &mut App<A>, answer: &str) {
    if !is_affirmative(answer) {
        app.cancel_delete();
        println!("Deletion cancelled.");
        return;
    }

    match app.confirm_delete().await {
        Some(true) => {
            if let Some(notice) = app.take_notice() {
                println!("{} {}", "✓".green(), notice);
            }
            show_documents(app);
            print_scope(app);
        }
        Some(false) => {
            if let Some(notice) = app.take_notice() {
                println!("{} {}", "✗".red(), notice);
            }
        }
        None => debug!("No delete pending"),
    }
}

fn show_documents<A: DocumentApi>(app: &App<A>) {
    print_document_rows(app.registry(), &app.rows());
}

fn scope_line<A: DocumentApi>(app: &App<A>) -> String {
    match (app.selection(), app.selected_document()) {
        (Selection::Document(_), Some(doc)) => format!("Querying: {}", doc.filename),
        _ => "Querying all available documents".to_string(),
    }
}

fn print_scope<A: DocumentApi>(app: &App<A>) {
    println!("{}", scope_line(app).cyan());
}

fn print_preview<A: DocumentApi>(app: &App<A>) {
    match app.preview().state() {
        PreviewState::Idle => println!("Select a document to see its preview."),
        PreviewState::Loading { filename } => println!("Loading preview of {}...", filename),
        PreviewState::Loaded(resource) => {
            println!(
                "🖼  Preview of {}: {} ({} bytes, {})",
                resource.filename(),
                resource.path().display(),
                resource.size(),
                resource.content_type().unwrap_or("unknown type")
            );
        }
        PreviewState::Failed { message, .. } => println!("{} {}", "⚠".yellow(), message),
    }
}

fn print_reply(reply: &ChatMessage) {
    println!("\n{} {}\n", format!("{}:", reply.role).bold(), reply.content);
}

fn print_prompt<A: DocumentApi>(app: &App<A>) -> Result<()> {
    let scope = match app.selected_document() {
        Some(doc) => doc.filename.as_str(),
        None => "all",
    };
    print!("{} ", format!("[{}] ›", scope).bold());
    io::stdout().flush()?;
    Ok(())
}
