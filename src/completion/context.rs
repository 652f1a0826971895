//! Command context resolution
//!
//! Walks the command tree along the complete tokens before the cursor and
//! records where the input currently stands: which commands are active, which
//! tokens belong to them and, for chained groups, how the line splits into
//! one segment per subcommand.
//!
//! Resolution never fails. Input that leaves the grammar is reported as a
//! [`Resolution::Partial`] carrying the last good context.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use super::command_tree::CommandNode;

/// One subcommand of a chained group together with its own tokens
#[derive(Debug, Clone)]
pub struct ChainSegment {
    /// The subcommand
    pub command: Arc<CommandNode>,
    /// Tokens following the subcommand name, up to the next segment
    pub args: Vec<String>,
}

impl PartialEq for ChainSegment {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.command, &other.command) && self.args == other.args
    }
}

/// Where the input stands within the command tree.
///
/// Immutable once built; a changed token list produces a new context.
#[derive(Debug, Clone)]
pub struct ParsedContext {
    /// Tokens the context was built from
    pub tokens: Vec<String>,
    /// Resolved commands, root first; never empty
    pub path: Vec<Arc<CommandNode>>,
    /// Tokens given to the active command itself (its options and arguments)
    pub args: Vec<String>,
    /// Chain segments, in input order, when the active command chains
    pub segments: Vec<ChainSegment>,
    /// Tokens that could not be placed in the grammar
    pub unresolved: Vec<String>,
}

impl PartialEq for ParsedContext {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
            && self.path.len() == other.path.len()
            && self
                .path
                .iter()
                .zip(&other.path)
                .all(|(a, b)| Arc::ptr_eq(a, b))
            && self.args == other.args
            && self.segments == other.segments
            && self.unresolved == other.unresolved
    }
}

impl ParsedContext {
    fn at_root(root: &Arc<CommandNode>, tokens: &[String]) -> Self {
        Self {
            tokens: tokens.to_vec(),
            path: vec![Arc::clone(root)],
            args: Vec::new(),
            segments: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    /// Deepest resolved command
    pub fn active(&self) -> &Arc<CommandNode> {
        // path always holds at least the root
        &self.path[self.path.len() - 1]
    }

    /// The chain segment the cursor is in: always the last one
    pub fn current_segment(&self) -> Option<&ChainSegment> {
        self.segments.last()
    }

    /// Whether `name` already started an earlier chain segment
    pub fn segment_used(&self, name: &str) -> bool {
        self.segments.iter().any(|s| s.command.name == name)
    }
}

/// Best-effort resolution result.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Every token found its place in the grammar
    Full(ParsedContext),
    /// Resolution stopped at an unknown token; `consumed` tokens were placed
    Partial {
        context: ParsedContext,
        consumed: usize,
    },
}

impl Resolution {
    /// The resolved context, whichever way resolution ended
    pub fn context(&self) -> &ParsedContext {
        match self {
            Resolution::Full(context) => context,
            Resolution::Partial { context, .. } => context,
        }
    }

    /// Whether every token was placed
    pub fn is_full(&self) -> bool {
        matches!(self, Resolution::Full(_))
    }
}

/// Resolve `tokens` against the tree rooted at `root`.
///
/// Pure function of its inputs. Hidden commands resolve by exact name or alias.
pub fn resolve(tokens: &[String], root: &Arc<CommandNode>) -> Resolution {
    let mut context = ParsedContext::at_root(root, tokens);
    let mut i = 0;

    while i < tokens.len() {
        let node = Arc::clone(context.active());

        if node.chains {
            split_chain(&node, &tokens[i..], &mut context);
            return Resolution::Full(context);
        }

        if !node.is_group {
            context.args.extend_from_slice(&tokens[i..]);
            return Resolution::Full(context);
        }

        let token = &tokens[i];
        if let Some(child) = node.child(token) {
            trace!(command = %child.name, "resolved subcommand");
            context.path.push(Arc::clone(child));
            context.args.clear();
            i += 1;
        } else if let Some(option) = node.option(token) {
            // Group-level option: consume it with its values
            let end = (i + 1 + option.form.arity()).min(tokens.len());
            context.args.extend_from_slice(&tokens[i..end]);
            i = end;
        } else {
            debug!(
                token = %token,
                group = %node.name,
                "token does not resolve to a subcommand"
            );
            context.unresolved = tokens[i..].to_vec();
            return Resolution::Partial {
                context,
                consumed: i,
            };
        }
    }

    Resolution::Full(context)
}

/// Distribute the tokens after a chained group's name over its subcommands.
///
/// A token starts a new segment when it names a subcommand and is not the
/// value of the option before it. Tokens before the first segment belong to
/// the group itself.
fn split_chain(group: &CommandNode, tokens: &[String], context: &mut ParsedContext) {
    let mut pending_values = 0usize;

    for token in tokens {
        if pending_values > 0 {
            pending_values -= 1;
            push_arg(context, token);
            continue;
        }

        let owner: &CommandNode = context
            .segments
            .last()
            .map(|segment| segment.command.as_ref())
            .unwrap_or(group);

        if let Some(option) = owner.option(token) {
            pending_values = option.form.arity();
            push_arg(context, token);
        } else if let Some(child) = group.child(token) {
            trace!(command = %child.name, "chain segment");
            context.segments.push(ChainSegment {
                command: Arc::clone(child),
                args: Vec::new(),
            });
        } else {
            push_arg(context, token);
        }
    }
}

fn push_arg(context: &mut ParsedContext, token: &str) {
    match context.segments.last_mut() {
        Some(segment) => segment.args.push(token.to_string()),
        None => context.args.push(token.to_string()),
    }
}

/// Resolver that remembers the last token list it saw.
///
/// Per-keystroke calls usually differ only in the token being typed, which is
/// not part of the resolved tokens, so most calls hit the cache.
#[derive(Debug)]
pub struct ContextResolver {
    root: Arc<CommandNode>,
    last: Mutex<Option<(Vec<String>, Arc<Resolution>)>>,
    computed: AtomicUsize,
}

impl ContextResolver {
    /// Create a resolver for the tree rooted at `root`
    pub fn new(root: Arc<CommandNode>) -> Self {
        Self {
            root,
            last: Mutex::new(None),
            computed: AtomicUsize::new(0),
        }
    }

    /// Root of the command tree
    pub fn root(&self) -> &Arc<CommandNode> {
        &self.root
    }

    /// Resolve `tokens`, reusing the previous result when they are unchanged
    pub fn resolve(&self, tokens: &[String]) -> Arc<Resolution> {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((cached_tokens, resolution)) = last.as_ref() {
            if cached_tokens.as_slice() == tokens {
                return Arc::clone(resolution);
            }
        }

        let resolution = Arc::new(resolve(tokens, &self.root));
        self.computed.fetch_add(1, Ordering::Relaxed);
        *last = Some((tokens.to_vec(), Arc::clone(&resolution)));
        resolution
    }

    /// Number of resolutions actually computed (cache misses)
    pub fn resolutions_computed(&self) -> usize {
        self.computed.load(Ordering::Relaxed)
    }
}
