//! Template processor.
//!
//! A template is parsed once into a flat list of [`Token`]s and then
//! rendered against a [`ProjectContext`].
//!
//! ## Syntax
//!
//! ```text
//! {{name}}                         project metadata
//! {{paths.components}}             layout path, via the path lookup
//! {{params.provider}}              current module parameter
//! {{module.id}} {{env.DATABASE_URL}} {{item}}
//! {{#if params.social}}...{{/if}}  conditional span
//! ```
//!
//! Conditionals do not nest. The first `{{/if}}` closes the open `{{#if}}`,
//! so an inner `{{#if}}` is rendered as unknown text and the outer close
//! tag is left behind. References that resolve to nothing stay as written.

use std::path::{Path, PathBuf};

use crate::domain::{
    capabilities::list_style_for,
    entities::context::ProjectContext,
    error::RenderError,
};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const IF_PREFIX: &str = "#if ";
const END_IF: &str = "/if";

/// Lookup for `{{paths.KEY}}` references.
pub type PathLookup<'a> = &'a dyn Fn(&str) -> Option<PathBuf>;

/// Path lookup that resolves nothing; `{{paths.*}}` stays literal.
pub fn no_paths(_key: &str) -> Option<PathBuf> {
    None
}

/// What the rendered text is for. Drives list formatting.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputHint<'a> {
    /// Target file, when rendering file content or a file path.
    pub path: Option<&'a Path>,
    /// Rendering a command line.
    pub command: bool,
}

impl<'a> OutputHint<'a> {
    pub fn file(path: &'a Path) -> Self {
        Self {
            path: Some(path),
            command: false,
        }
    }

    pub fn command() -> Self {
        Self {
            path: None,
            command: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    /// Tag content between the braces, as written.
    Variable(String),
    Conditional { condition: String, body: Vec<Token> },
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, RenderError> {
        Ok(Self {
            tokens: tokenize(source, true)?,
        })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn render(
        &self,
        ctx: &ProjectContext,
        hint: OutputHint<'_>,
        paths: PathLookup<'_>,
    ) -> Result<String, RenderError> {
        let mut out = String::new();
        render_tokens(&self.tokens, ctx, hint, paths, &mut out)?;
        Ok(out)
    }
}

/// Parse and render in one step.
pub fn render(
    template: &str,
    ctx: &ProjectContext,
    hint: OutputHint<'_>,
    paths: PathLookup<'_>,
) -> Result<String, RenderError> {
    Template::parse(template)?.render(ctx, hint, paths)
}

/// Evaluate a condition expression.
///
/// `true` and `false` are literals; `params.NAME` and `module.NAME` are
/// looked up and cast to truthiness. Anything else is false.
pub fn evaluate_condition(expr: &str, ctx: &ProjectContext) -> bool {
    match expr.trim() {
        "true" => true,
        "false" | "" => false,
        reference => ctx.lookup(reference).is_some_and(|v| v.is_truthy()),
    }
}

/// Split a rendered command line into argv with POSIX shell quoting rules.
pub fn split_command(line: &str) -> Result<Vec<String>, RenderError> {
    let args = shlex::split(line).ok_or_else(|| RenderError::UnbalancedQuote {
        command: line.to_string(),
    })?;
    if args.is_empty() {
        return Err(RenderError::EmptyCommand);
    }
    Ok(args)
}

// ── Parsing ──────────────────────────────────────────────────────────────────

fn tokenize(source: &str, blocks: bool) -> Result<Vec<Token>, RenderError> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    while let Some(rel) = source[pos..].find(OPEN) {
        let start = pos + rel;
        let Some(close_rel) = source[start + OPEN.len()..].find(CLOSE) else {
            break;
        };
        let inner_start = start + OPEN.len();
        let inner_end = inner_start + close_rel;
        let tag_end = inner_end + CLOSE.len();
        let inner = source[inner_start..inner_end].trim();

        literal.push_str(&source[pos..start]);

        match inner.strip_prefix(IF_PREFIX) {
            Some(condition) if blocks => {
                let Some(end_rel) = find_end_if(&source[tag_end..]) else {
                    return Err(RenderError::UnclosedConditional {
                        condition: condition.trim().to_string(),
                        offset: start,
                    });
                };
                flush(&mut literal, &mut tokens);
                let body_src = &source[tag_end..tag_end + end_rel.0];
                tokens.push(Token::Conditional {
                    condition: condition.trim().to_string(),
                    body: tokenize(body_src, false)?,
                });
                pos = tag_end + end_rel.1;
                continue;
            }
            _ => {}
        }

        if blocks && inner == END_IF {
            literal.push_str(&source[start..tag_end]);
        } else {
            flush(&mut literal, &mut tokens);
            tokens.push(Token::Variable(source[inner_start..inner_end].to_string()));
        }
        pos = tag_end;
    }

    literal.push_str(&source[pos..]);
    flush(&mut literal, &mut tokens);
    Ok(tokens)
}

/// Locate the first `{{/if}}` in `rest`: (start of tag, end of tag).
fn find_end_if(rest: &str) -> Option<(usize, usize)> {
    let mut pos = 0;
    while let Some(rel) = rest[pos..].find(OPEN) {
        let start = pos + rel;
        let inner_start = start + OPEN.len();
        let close_rel = rest[inner_start..].find(CLOSE)?;
        let inner_end = inner_start + close_rel;
        if rest[inner_start..inner_end].trim() == END_IF {
            return Some((start, inner_end + CLOSE.len()));
        }
        pos = inner_start;
    }
    None
}

fn flush(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

fn render_tokens(
    tokens: &[Token],
    ctx: &ProjectContext,
    hint: OutputHint<'_>,
    paths: PathLookup<'_>,
    out: &mut String,
) -> Result<(), RenderError> {
    for token in tokens {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Variable(name) => match resolve_variable(name, ctx, hint, paths)? {
                Some(value) => out.push_str(&value),
                None => {
                    out.push_str(OPEN);
                    out.push_str(name);
                    out.push_str(CLOSE);
                }
            },
            Token::Conditional { condition, body } => {
                if evaluate_condition(condition, ctx) {
                    render_tokens(body, ctx, hint, paths, out)?;
                }
            }
        }
    }
    Ok(())
}

fn resolve_variable(
    name: &str,
    ctx: &ProjectContext,
    hint: OutputHint<'_>,
    paths: PathLookup<'_>,
) -> Result<Option<String>, RenderError> {
    let name = name.trim();
    if let Some(key) = name.strip_prefix("paths.") {
        return Ok(paths(key).map(|p| p.to_string_lossy().replace('\\', "/")));
    }

    if let Some(value) = ctx.metadata_var(name) {
        return Ok(Some(value));
    }

    if let Some(param) = name.strip_prefix("params.") {
        return match ctx.param(param) {
            Some(value) => Ok(Some(
                value.render_for(list_style_for(hint.path, hint.command)),
            )),
            None if ctx.param_is_required(param) => Err(RenderError::MissingParameter {
                module: ctx
                    .current_module()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                name: param.to_string(),
            }),
            None => Ok(None),
        };
    }

    if let Some(key) = name.strip_prefix("module.") {
        return Ok(ctx.module_var(key));
    }

    if let Some(key) = name.strip_prefix("env.") {
        return Ok(ctx.env_var(key).map(String::from));
    }

    if name == "item" {
        return Ok(ctx.item().map(String::from));
    }

    Ok(None)
}
