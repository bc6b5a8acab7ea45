//! Schema extraction from a Ripper tree of a Rails `schema.rb`.
//!
//! The tree is walked defensively: every slot is looked up through
//! [`Node::child`] and a missing or mistyped slot inside a recognized
//! directive aborts the run with [`ExtractError::Malformed`].

use crate::model::{Column, OptionValue, Schema, Table};
use crate::node::Node;
use tracing::{debug, trace};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Malformed {context}: expected {expected}")]
    Malformed {
        context: String,
        expected: &'static str,
    },
    #[error("Foreign key from undeclared table \"{from}\" to \"{to}\"")]
    UnknownTable { from: String, to: String },
}

fn malformed(context: impl Into<String>, expected: &'static str) -> ExtractError {
    ExtractError::Malformed {
        context: context.into(),
        expected,
    }
}

/// Build the schema model from the root `[:program, ...]` node.
pub fn extract(root: &Node) -> Result<Schema, ExtractError> {
    Extractor::new().run(root)
}

struct Extractor {
    schema: Schema,
}

/// Arguments of a call, split into positional values and the trailing
/// keyword hash.
struct Args<'a> {
    positional: Vec<&'a Node>,
    options: Option<&'a Node>,
}

impl<'a> Args<'a> {
    fn positional(
        &self,
        index: usize,
        context: &str,
        expected: &'static str,
    ) -> Result<&'a Node, ExtractError> {
        self.positional
            .get(index)
            .copied()
            .ok_or_else(|| malformed(context, expected))
    }
}

impl Extractor {
    fn new() -> Self {
        Self {
            schema: Schema::new(),
        }
    }

    fn run(mut self, root: &Node) -> Result<Schema, ExtractError> {
        for directive in schema_directives(root)? {
            match directive.tag() {
                Some("command") => self.command(directive)?,
                Some("method_add_block") => self.block_directive(directive)?,
                Some("void_stmt") => {}
                tag => debug!(tag = tag.unwrap_or("-"), "skipping unrecognized directive"),
            }
        }
        Ok(self.schema)
    }

    /// `name arg, ...` without a block.
    fn command(&mut self, command: &Node) -> Result<(), ExtractError> {
        let Some(name) = command.child(0).and_then(Node::token_text) else {
            debug!("skipping command without identifier");
            return Ok(());
        };

        match name {
            "add_foreign_key" => self.foreign_key(command),
            "create_table" => {
                let table = table_header(command)?;
                self.register(table);
                Ok(())
            }
            other => {
                debug!(directive = other, "ignoring directive");
                Ok(())
            }
        }
    }

    /// `name arg, ... do ... end`; only `create_table` is modelled.
    fn block_directive(&mut self, directive: &Node) -> Result<(), ExtractError> {
        let call = match directive.child(0) {
            Some(call) if call.is_tagged("command") => call,
            _ => {
                debug!("skipping block directive that is not a command");
                return Ok(());
            }
        };

        match call.child(0).and_then(Node::token_text) {
            Some("create_table") => {
                let table = table(call, directive)?;
                self.register(table);
            }
            Some(other) => debug!(directive = other, "ignoring block directive"),
            None => debug!("skipping block directive without identifier"),
        }
        Ok(())
    }

    fn register(&mut self, table: Table) {
        if self.schema.get(&table.name).is_some() {
            debug!(table = %table.name, "table declared again, replacing earlier declaration");
        }
        debug!(table = %table.name, columns = table.columns.len(), "registered table");
        self.schema.insert(table);
    }

    fn foreign_key(&mut self, command: &Node) -> Result<(), ExtractError> {
        const CONTEXT: &str = "add_foreign_key";
        let args = arguments(command.child(1), CONTEXT)?;
        let from = name_text(args.positional(0, CONTEXT, "source table argument")?)
            .ok_or_else(|| malformed(CONTEXT, "source table name"))?;
        let to = name_text(args.positional(1, CONTEXT, "target table argument")?)
            .ok_or_else(|| malformed(CONTEXT, "target table name"))?;

        match self.schema.get_mut(&from) {
            Some(table) => {
                debug!(from = %from, to = %to, "registered foreign key");
                table.add_foreign_table(to);
                Ok(())
            }
            None => Err(ExtractError::UnknownTable { from, to }),
        }
    }
}

/// Statements of the first block call in the program, i.e. the body of
/// `ActiveRecord::Schema.define(...) do ... end`.
fn schema_directives(root: &Node) -> Result<&[Node], ExtractError> {
    const CONTEXT: &str = "program";
    if !root.is_tagged("program") {
        return Err(malformed(CONTEXT, "[:program, ...] root node"));
    }
    let statements = root
        .child(0)
        .and_then(Node::as_list)
        .ok_or_else(|| malformed(CONTEXT, "statement list"))?;
    let define = statements
        .iter()
        .find(|s| s.is_tagged("method_add_block"))
        .ok_or_else(|| malformed(CONTEXT, "schema definition block"))?;
    block_body(define, "schema definition block")
}

/// Statement list of a `method_add_block` node's `do`/brace block.
fn block_body<'a>(node: &'a Node, context: &str) -> Result<&'a [Node], ExtractError> {
    let block = node
        .child(1)
        .filter(|b| b.is_tagged("do_block") || b.is_tagged("brace_block"))
        .ok_or_else(|| malformed(context, "do/brace block"))?;
    let body = block
        .child(1)
        .ok_or_else(|| malformed(context, "block body"))?;
    let statements = if body.is_tagged("bodystmt") {
        body.child(0)
    } else {
        Some(body)
    };
    statements
        .and_then(Node::as_list)
        .ok_or_else(|| malformed(context, "statement list in block body"))
}

/// A `create_table` block directive with its columns.
fn table(call: &Node, directive: &Node) -> Result<Table, ExtractError> {
    let mut table = table_header(call)?;
    let context = format!("column declaration in table \"{}\"", table.name);

    for statement in block_body(directive, &context)? {
        if statement.is_tagged("void_stmt") {
            continue;
        }
        let column = column(statement, &context)?;
        trace!(
            table = %table.name,
            typ = %column.typ,
            name = column.name().unwrap_or("-"),
            "column"
        );
        table.columns.push(column);
    }

    Ok(table)
}

/// Name and `comment:` of a `create_table` command.
fn table_header(command: &Node) -> Result<Table, ExtractError> {
    const CONTEXT: &str = "create_table";
    let args = arguments(command.child(1), CONTEXT)?;
    let name = name_text(args.positional(0, CONTEXT, "table name argument")?)
        .ok_or_else(|| malformed(CONTEXT, "table name string"))?;

    let mut table = Table::new(name);
    if let Some(hash) = args.options {
        for (key, value) in keyword_pairs(hash, CONTEXT)? {
            if key == "comment" {
                table.comment = option_value(value).as_str().to_string();
            }
        }
    }
    Ok(table)
}

/// One `t.<type> ...` line inside a `create_table` block.
fn column(statement: &Node, context: &str) -> Result<Column, ExtractError> {
    let (method, args) = match statement.tag() {
        // t.string "name", null: false
        Some("command_call") => (statement.child(2), statement.child(3)),
        // t.string("name", null: false)
        Some("method_add_arg") => {
            let call = statement
                .child(0)
                .filter(|c| c.is_tagged("call"))
                .ok_or_else(|| malformed(context, "method call"))?;
            let args = statement
                .child(1)
                .filter(|p| p.is_tagged("arg_paren"))
                .and_then(|p| p.child(0));
            (call.child(2), args)
        }
        _ => return Err(malformed(context, "t.<type> \"name\" call")),
    };

    let typ = method
        .and_then(Node::token_text)
        .ok_or_else(|| malformed(context, "column type identifier"))?;
    let args = arguments(args, context)?;

    let mut column = if typ == "index" {
        let keys = index_keys(args.positional(0, context, "index column list")?, context)?;
        Column::index(keys)
    } else {
        let name = name_text(args.positional(0, context, "column name argument")?)
            .ok_or_else(|| malformed(context, "column name string"))?;
        Column::regular(typ, name)
    };

    if let Some(hash) = args.options {
        for (key, value) in keyword_pairs(hash, context)? {
            column.set_option(key, option_value(value));
        }
    }

    Ok(column)
}

/// Column list of `t.index`. An expression index such as
/// `t.index "lower((email)::text)"` yields the expression as its one key.
fn index_keys(node: &Node, context: &str) -> Result<Vec<String>, ExtractError> {
    if node.is_tagged("string_literal") {
        let expression =
            string_content(node).ok_or_else(|| malformed(context, "index expression string"))?;
        return Ok(vec![expression]);
    }
    if !node.is_tagged("array") {
        return Err(malformed(context, "array of index columns or expression string"));
    }
    // `[]` reads as [:array, nil]
    let Some(items) = node.child(0) else {
        return Ok(Vec::new());
    };
    items
        .as_list()
        .ok_or_else(|| malformed(context, "index column list"))?
        .iter()
        .map(|item| name_text(item).ok_or_else(|| malformed(context, "index column name")))
        .collect()
}

/// Unpacks `[:args_add_block, [args...], false]`.
fn arguments<'a>(node: Option<&'a Node>, context: &str) -> Result<Args<'a>, ExtractError> {
    let items = node
        .filter(|n| n.is_tagged("args_add_block"))
        .and_then(|n| n.child(0))
        .and_then(Node::as_list)
        .ok_or_else(|| malformed(context, "argument list"))?;

    let mut positional = Vec::new();
    let mut options = None;
    for item in items {
        if item.is_tagged("bare_assoc_hash") {
            options = Some(item);
        } else {
            positional.push(item);
        }
    }
    Ok(Args {
        positional,
        options,
    })
}

/// Key/value pairs of a `bare_assoc_hash`, keys without their trailing colon.
fn keyword_pairs<'a>(
    hash: &'a Node,
    context: &str,
) -> Result<Vec<(String, Option<&'a Node>)>, ExtractError> {
    let pairs = hash
        .child(0)
        .and_then(Node::as_list)
        .ok_or_else(|| malformed(context, "keyword argument list"))?;

    pairs
        .iter()
        .map(|pair| {
            if !pair.is_tagged("assoc_new") {
                return Err(malformed(context, "key: value pair"));
            }
            let key = pair
                .child(0)
                .and_then(keyword_name)
                .ok_or_else(|| malformed(context, "keyword name"))?;
            Ok((key, pair.child(1)))
        })
        .collect()
}

fn keyword_name(node: &Node) -> Option<String> {
    match node.tag()? {
        "@label" => node
            .token_text()
            .map(|label| label.strip_suffix(':').unwrap_or(label).to_string()),
        "symbol_literal" | "string_literal" => name_text(node),
        _ => None,
    }
}

/// A table or column name: a string literal, a symbol or a bare reference.
fn name_text(node: &Node) -> Option<String> {
    match node.tag()? {
        "string_literal" => string_content(node),
        "symbol_literal" => symbol_name(node),
        "var_ref" | "vcall" => node.child(0).and_then(Node::token_text).map(str::to_string),
        _ => None,
    }
}

/// Content of a non-interpolated string literal.
fn string_content(node: &Node) -> Option<String> {
    let content = node.child(0)?;
    if !content.is_tagged("string_content") {
        return None;
    }
    content
        .children()
        .iter()
        .map(|part| {
            if part.is_tagged("@tstring_content") {
                part.token_text()
            } else {
                None
            }
        })
        .collect()
}

/// `[:symbol_literal, [:symbol, [:@ident, "cascade", pos]]]`
fn symbol_name(node: &Node) -> Option<String> {
    let symbol = node.child(0)?;
    let token = if symbol.is_tagged("symbol") {
        symbol.child(0)?
    } else {
        symbol
    };
    token.token_text().map(str::to_string)
}

fn const_path(node: &Node) -> Option<String> {
    match node.tag()? {
        "const_path_ref" => {
            let parent = const_path(node.child(0)?)?;
            let name = node.child(1)?.token_text()?;
            Some(format!("{}::{}", parent, name))
        }
        "var_ref" | "top_const_ref" => node.child(0)?.token_text().map(str::to_string),
        _ => None,
    }
}

/// Resolves an option value. Strings keep their content; references,
/// symbols and numbers keep their raw token text; anything compound
/// becomes an empty string.
fn option_value(node: Option<&Node>) -> OptionValue {
    let Some(node) = node else {
        return OptionValue::Str(String::new());
    };

    let ident = match node.tag() {
        Some("string_literal") => {
            return OptionValue::Str(string_content(node).unwrap_or_default());
        }
        Some("var_ref") | Some("vcall") => {
            node.child(0).and_then(Node::token_text).map(str::to_string)
        }
        Some("const_path_ref") => const_path(node),
        Some("symbol_literal") => symbol_name(node),
        Some("@int") | Some("@float") | Some("@rational") | Some("@imaginary") => {
            node.token_text().map(str::to_string)
        }
        Some("unary") => negative_number(node),
        _ => None,
    };

    match ident {
        Some(text) => OptionValue::Ident(text),
        None => OptionValue::Str(String::new()),
    }
}

/// `[:unary, :-@, [:@int, "1", pos]]` as `-1`.
fn negative_number(node: &Node) -> Option<String> {
    match node.child(0)? {
        Node::Symbol(op) if op == "-@" => {}
        _ => return None,
    }
    let operand = node.child(1)?;
    match operand.tag()? {
        "@int" | "@float" => operand.token_text().map(|n| format!("-{}", n)),
        _ => None,
    }
}
