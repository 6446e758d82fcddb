//! Text persistence of connectivity graphs and cost tables.
//!
//! Target file layout:
//!
//! ```text
//! N
//! N rows of N tokens, X (edge) or - (no edge)
//! N rows of N costs
//! for every ordered pair (v, w), v != w, row-major:
//!   cnot(v,w) =>
//!   one step per line: <token> <a> <b> [<c>]
//!   cost = <sum>
//! ```
//!
//! The header is line oriented. The path section is read as a whitespace
//! separated token stream.
//!
//! Edge-list graph layout: the qubit count followed by `v w` pairs, one
//! directed edge each, in any whitespace layout.
//!
//! Both readers reject qubit counts above [`MAX_QUBITS`].

use std::io::{Read, Write};

use crate::error::{CompileError, CompileResult};
use crate::graph::ConnectivityGraph;
use crate::path::{StepKind, TransformationPath, TransformationStep};
use crate::table::CostPathTable;

/// Largest qubit count the readers accept.
pub const MAX_QUBITS: usize = 4096;

/// Read a graph and its table from the target file format.
pub fn read_target(
    mut reader: impl Read,
) -> CompileResult<(ConnectivityGraph, CostPathTable)> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_target(&text)
}

/// Write a graph and its table in the target file format.
pub fn write_target(
    mut writer: impl Write,
    graph: &ConnectivityGraph,
    table: &CostPathTable,
) -> CompileResult<()> {
    writeln!(writer, "{}", graph.num_qubits())?;
    write!(writer, "{graph}")?;
    write!(writer, "{table}")?;
    for (v, w, path) in table.iter() {
        writeln!(writer, "cnot({v},{w}) =>")?;
        write!(writer, "{path}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a graph from the edge-list format.
pub fn read_edge_list(mut reader: impl Read) -> CompileResult<ConnectivityGraph> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let mut tokens = Tokens::new(text.lines().enumerate().map(|(i, l)| (i + 1, l)));
    let (line, n) = tokens.number("qubit count")?;
    let n = checked_size(line, n as usize)?;
    let mut edges = Vec::new();
    while !tokens.is_empty() {
        let v = tokens.qubit(n)?;
        let w = tokens.qubit(n)?;
        if v == w {
            return Err(CompileError::format(
                tokens.line,
                format!("self-loop on qubit {v}"),
            ));
        }
        edges.push((v, w));
    }
    let mut adjacency = vec![false; n * n];
    for (v, w) in edges {
        adjacency[v as usize * n + w as usize] = true;
    }
    Ok(ConnectivityGraph::from_matrix(n, adjacency))
}

fn checked_size(line: usize, n: usize) -> CompileResult<usize> {
    if n > MAX_QUBITS {
        return Err(CompileError::format(
            line,
            format!("qubit count {n} exceeds the supported maximum of {MAX_QUBITS}"),
        ));
    }
    Ok(n)
}

fn parse_target(text: &str) -> CompileResult<(ConnectivityGraph, CostPathTable)> {
    let mut tokens = Tokens::new(
        text.lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l))
            .filter(|(_, l)| !l.trim().is_empty()),
    );

    let (line, size) = tokens.row("qubit count")?;
    let n: usize = match size.as_slice() {
        [count] => count
            .parse()
            .map_err(|_| CompileError::format(line, format!("invalid qubit count '{count}'")))?,
        _ => return Err(CompileError::format(line, "expected a single qubit count")),
    };
    let n = checked_size(line, n)?;

    // Rows are validated as they are read; nothing is sized from the header.
    let mut adjacency = Vec::new();
    for v in 0..n {
        let (line, cells) = tokens.row("graph row")?;
        if cells.len() != n {
            return Err(CompileError::format(
                line,
                format!("graph row has {} entries, expected {n}", cells.len()),
            ));
        }
        for (w, cell) in cells.into_iter().enumerate() {
            let edge = match cell {
                "X" => true,
                "-" => false,
                other => {
                    return Err(CompileError::format(
                        line,
                        format!("invalid adjacency entry '{other}'"),
                    ));
                }
            };
            if edge && v == w {
                return Err(CompileError::format(line, format!("self-loop on qubit {v}")));
            }
            adjacency.push(edge);
        }
    }

    let mut costs = Vec::new();
    for v in 0..n {
        let (line, cells) = tokens.row("cost row")?;
        if cells.len() != n {
            return Err(CompileError::format(
                line,
                format!("cost row has {} entries, expected {n}", cells.len()),
            ));
        }
        for (w, cell) in cells.into_iter().enumerate() {
            let cost: u32 = cell
                .parse()
                .map_err(|_| CompileError::format(line, format!("invalid cost '{cell}'")))?;
            if v == w && cost != 0 {
                return Err(CompileError::format(
                    line,
                    format!("diagonal cost of qubit {v} is {cost}, expected 0"),
                ));
            }
            costs.push(cost);
        }
    }

    let graph = ConnectivityGraph::from_matrix(n, adjacency);
    let mut paths = Vec::new();
    for v in 0..n as u32 {
        for w in 0..n as u32 {
            if v == w {
                paths.push(TransformationPath::default());
            } else {
                let expected = costs[v as usize * n + w as usize];
                paths.push(parse_path(&mut tokens, &graph, v, w, expected)?);
            }
        }
    }
    if let Some((line, token)) = tokens.next() {
        return Err(CompileError::format(
            line,
            format!("unexpected trailing token '{token}'"),
        ));
    }

    Ok((graph, CostPathTable::from_paths(n, paths)))
}

/// Parse the path for cnot(v, w). The path must use only edges of `graph`,
/// realize cnot(v, w) and sum to the cost given by its cost line and cost row.
fn parse_path<'a, I>(
    tokens: &mut Tokens<'a, I>,
    graph: &ConnectivityGraph,
    v: u32,
    w: u32,
    expected_cost: u32,
) -> CompileResult<TransformationPath>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let marker = format!("cnot({v},{w})");
    let (line, token) = tokens.expect(&marker)?;
    if token != marker {
        return Err(CompileError::format(
            line,
            format!("expected marker '{marker}', found '{token}'"),
        ));
    }
    tokens.keyword("=>")?;

    let n = graph.num_qubits();
    let mut steps = Vec::new();
    loop {
        let (line, token) = tokens.expect("step or cost line")?;
        if token.starts_with("cost") {
            tokens.keyword("=")?;
            let (line, cost) = tokens.number("path cost")?;
            if cost != expected_cost {
                return Err(CompileError::format(
                    line,
                    format!("cost of cnot({v},{w}) is {cost}, cost row says {expected_cost}"),
                ));
            }
            let path = TransformationPath::new(steps);
            if path.cost() != cost {
                return Err(CompileError::format(
                    line,
                    format!("steps of cnot({v},{w}) cost {}, file says {cost}", path.cost()),
                ));
            }
            if !path.realizes(v, w) {
                return Err(CompileError::format(
                    line,
                    format!("path does not realize cnot({v},{w})"),
                ));
            }
            return Ok(path);
        }

        let kind: StepKind = token
            .parse()
            .map_err(|message: String| CompileError::format(line, message))?;
        let a = tokens.qubit(n)?;
        let b = tokens.qubit(n)?;
        let step = if kind == StepKind::Cnot3 {
            TransformationStep::cascade(a, b, tokens.qubit(n)?)
        } else {
            TransformationStep::new(kind, a, b)
        };
        if let Some((c, t)) = step.edges().find(|&(c, t)| !graph.has_edge(c, t)) {
            return Err(CompileError::format(
                line,
                format!("step '{step}' needs missing edge {c} -> {t}"),
            ));
        }
        steps.push(step);
    }
}

/// Whitespace-separated tokens tagged with their 1-based line number.
struct Tokens<'a, I: Iterator<Item = (usize, &'a str)>> {
    lines: I,
    current: std::vec::IntoIter<&'a str>,
    peeked: Option<(usize, &'a str)>,
    /// Line of the last token or row handed out.
    line: usize,
}

impl<'a, I: Iterator<Item = (usize, &'a str)>> Tokens<'a, I> {
    fn new(lines: I) -> Self {
        Self {
            lines,
            current: Vec::new().into_iter(),
            peeked: None,
            line: 0,
        }
    }

    fn advance(&mut self) -> Option<(usize, &'a str)> {
        loop {
            if let Some(token) = self.current.next() {
                return Some((self.line, token));
            }
            let (line, text) = self.lines.next()?;
            self.line = line;
            self.current = text.split_whitespace().collect::<Vec<_>>().into_iter();
        }
    }

    /// Next whole line, split into tokens. Only valid before any token was read.
    fn row(&mut self, what: &str) -> CompileResult<(usize, Vec<&'a str>)> {
        match self.lines.next() {
            Some((line, text)) => {
                self.line = line;
                Ok((line, text.split_whitespace().collect()))
            }
            None => Err(self.eof(what)),
        }
    }

    fn next(&mut self) -> Option<(usize, &'a str)> {
        self.peeked.take().or_else(|| self.advance())
    }

    fn is_empty(&mut self) -> bool {
        if self.peeked.is_none() {
            self.peeked = self.advance();
        }
        self.peeked.is_none()
    }

    fn eof(&self, what: &str) -> CompileError {
        CompileError::format(self.line, format!("unexpected end of input, expected {what}"))
    }

    fn expect(&mut self, what: &str) -> CompileResult<(usize, &'a str)> {
        self.next().ok_or_else(|| self.eof(what))
    }

    fn keyword(&mut self, keyword: &str) -> CompileResult<()> {
        let (line, token) = self.expect(&format!("'{keyword}'"))?;
        if token == keyword {
            Ok(())
        } else {
            Err(CompileError::format(
                line,
                format!("expected '{keyword}', found '{token}'"),
            ))
        }
    }

    fn number(&mut self, what: &str) -> CompileResult<(usize, u32)> {
        let (line, token) = self.expect(what)?;
        let value = token
            .parse()
            .map_err(|_| CompileError::format(line, format!("invalid {what} '{token}'")))?;
        Ok((line, value))
    }

    fn qubit(&mut self, n: usize) -> CompileResult<u32> {
        let (line, q) = self.number("qubit index")?;
        if q as usize >= n {
            return Err(CompileError::format(
                line,
                format!("qubit {q} out of range for {n} qubits"),
            ));
        }
        Ok(q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_to_string(graph: &ConnectivityGraph, table: &CostPathTable) -> String {
        let mut buf = Vec::new();
        write_target(&mut buf, graph, table).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_write_layout() {
        let graph = ConnectivityGraph::linear(2);
        let table = CostPathTable::build(&graph).unwrap();
        let text = write_to_string(&graph, &table);
        assert_eq!(
            text,
            "2\n- X\n- -\n0 0\n4 0\ncnot(0,1) =>\nnop 0 1\ncost = 0\ncnot(1,0) =>\nflip 1 0\ncost = 4\n"
        );
    }

    #[test]
    fn test_roundtrip() {
        let graph = ConnectivityGraph::ibm_qx2();
        let table = CostPathTable::build(&graph).unwrap();
        let text = write_to_string(&graph, &table);

        let (graph2, table2) = read_target(text.as_bytes()).unwrap();
        assert_eq!(graph2, graph);
        assert_eq!(table2, table);
    }

    #[test]
    fn test_read_free_token_layout() {
        let text = "2\nX -\n- -\n";
        let err = read_target(text.as_bytes()).unwrap_err();
        assert!(matches!(err, CompileError::Format { line: 2, .. }));

        let text = "2\n- X\n- -\n0 0\n4 0\ncnot(0,1) => nop 0 1 cost = 0\ncnot(1,0) =>\n  flip\n 1 0\ncost = 4\n";
        let (graph, table) = read_target(text.as_bytes()).unwrap();
        assert!(graph.has_edge(0, 1));
        assert_eq!(table.path(1, 0).steps()[0].kind, StepKind::Flip);
    }

    #[test]
    fn test_read_errors() {
        let cases = [
            ("", 0),
            ("x\n", 1),
            ("2\n- X\n", 2),
            ("2\n- X X\n- -\n", 2),
            ("2\n- X\n- -\n0 0\n4\n", 5),
            ("2\n- X\n- -\n0 0\n4 0\ncnot(1,0) =>\n", 6),
            ("2\n- X\n- -\n0 0\n4 0\ncnot(0,1) =>\nswap 0 1\ncost = 0\n", 7),
            ("2\n- X\n- -\n0 0\n4 0\ncnot(0,1) =>\nnop 0 2\ncost = 0\n", 7),
            ("2\n- X\n- -\n0 0\n4 0\ncnot(0,1) =>\nnop 0 1\ncost = 3\n", 8),
            ("2\n- X\n- -\n0 0\n4 0\ncnot(0,1) =>\nnop 0 1\n", 7),
        ];
        for (text, line) in cases {
            match read_target(text.as_bytes()) {
                Err(CompileError::Format { line: got, .. }) => {
                    assert_eq!(got, line, "input {text:?}");
                }
                other => panic!("expected format error for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_read_rejects_inconsistent_paths() {
        let cases = [
            // steps sum to 0, cost line and row say 7
            ("2\n- X\n- -\n0 7\n4 0\ncnot(0,1) =>\nnop 0 1\ncost = 7\n", 8),
            // cnot 1 -> 0 is not an edge
            ("2\n- X\n- -\n0 0\n4 0\ncnot(0,1) =>\nnop 1 0\ncost = 0\n", 7),
            // no CNOT applied at all
            ("2\n- X\n- -\n0 0\n4 0\ncnot(0,1) =>\ncost = 0\n", 7),
            // control moved to 1 and never moved back
            (
                "3\n- X -\n- - X\n- - -\n0 0 6\n4 0 0\n4 4 0\n\
                 cnot(0,1) =>\nnop 0 1\ncost = 0\n\
                 cnot(0,2) =>\ncab 0 1\nnop 1 2\ncost = 6\n",
                14,
            ),
        ];
        for (text, line) in cases {
            match read_target(text.as_bytes()) {
                Err(CompileError::Format { line: got, .. }) => {
                    assert_eq!(got, line, "input {text:?}");
                }
                other => panic!("expected format error for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_read_rejects_oversized_header() {
        assert!(matches!(
            read_target("5000000000\n".as_bytes()),
            Err(CompileError::Format { line: 1, .. })
        ));
        assert!(matches!(
            read_edge_list("4000000000\n0 1\n".as_bytes()),
            Err(CompileError::Format { line: 1, .. })
        ));

        // A header within bounds still needs every row to be present.
        let header = format!("{MAX_QUBITS}\n");
        assert!(matches!(
            read_target(header.as_bytes()),
            Err(CompileError::Format { line: 1, .. })
        ));
        let graph = read_edge_list(format!("{MAX_QUBITS}\n0 1\n").as_bytes()).unwrap();
        assert_eq!(graph.num_qubits(), MAX_QUBITS);
    }

    #[test]
    fn test_edge_list() {
        let text = "5\n0 1\n0 2\n3 2 3 4\n";
        let graph = read_edge_list(text.as_bytes()).unwrap();
        assert_eq!(graph.num_qubits(), 5);
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![(0, 1), (0, 2), (3, 2), (3, 4)]);

        assert!(matches!(
            read_edge_list("3\n0 1\n2".as_bytes()),
            Err(CompileError::Format { line: 3, .. })
        ));
        assert!(matches!(
            read_edge_list("3\n0 3\n".as_bytes()),
            Err(CompileError::Format { line: 2, .. })
        ));
    }
}
