//! Gate expansion: lowering CNOTs onto the native edges of a target.

use tracing::{debug, info, instrument};

use cxmap_ir::{Circuit, Gate, GateKind, QubitId};

use crate::error::{CompileError, CompileResult};
use crate::path::{StepKind, TransformationPath, TransformationStep, replay_len};
use crate::target::Target;

#[derive(Debug, Clone, Copy)]
enum Operand {
    A,
    B,
    C,
}

#[derive(Debug, Clone, Copy)]
enum Primitive {
    H(Operand),
    Cx(Operand, Operand),
}

use Operand::{A, B, C};
use Primitive::{Cx, H};

const CAB: &[Primitive] = &[H(A), H(B), Cx(A, B), H(A), H(B), Cx(A, B)];
const CBA: &[Primitive] = &[Cx(B, A), H(A), H(B), Cx(B, A), H(B)];
const TAB: &[Primitive] = &[Cx(A, B), H(A), H(B), Cx(A, B), H(B)];
const TBA: &[Primitive] = &[H(A), H(B), Cx(B, A), H(A), H(B), Cx(B, A)];
const CAB_INV: &[Primitive] = &[Cx(A, B), H(A), H(B), Cx(A, B), H(A), H(B)];
const CBA_INV: &[Primitive] = &[H(B), Cx(B, A), H(A), H(B), Cx(B, A)];
const TAB_INV: &[Primitive] = &[H(B), Cx(A, B), H(A), H(B), Cx(A, B)];
const TBA_INV: &[Primitive] = &[Cx(B, A), H(A), H(B), Cx(B, A), H(A), H(B)];
const NOP: &[Primitive] = &[Cx(A, B)];
const FLIP: &[Primitive] = &[H(A), H(B), Cx(B, A), H(A), H(B)];
const CASCADE: &[Primitive] = &[Cx(A, B), Cx(B, C), Cx(A, B), Cx(B, C)];

fn primitives(kind: StepKind) -> &'static [Primitive] {
    match kind {
        StepKind::Cab => CAB,
        StepKind::Cba => CBA,
        StepKind::Tab => TAB,
        StepKind::Tba => TBA,
        StepKind::CabInv => CAB_INV,
        StepKind::CbaInv => CBA_INV,
        StepKind::TabInv => TAB_INV,
        StepKind::TbaInv => TBA_INV,
        StepKind::Nop => NOP,
        StepKind::Flip => FLIP,
        StepKind::Cnot3 => CASCADE,
    }
}

impl Primitive {
    fn gate(self, step: &TransformationStep) -> Gate {
        let qubit = |op| match op {
            A => QubitId(step.a),
            B => QubitId(step.b),
            C => QubitId(step.c.unwrap_or(step.b)),
        };
        match self {
            H(t) => Gate::hadamard(qubit(t)),
            Cx(c, t) => Gate::cnot(qubit(c), qubit(t)),
        }
    }
}

/// Lower a path to primitive H and CX gates.
///
/// The first cascade emits four CNOTs. The n-th cascade after it emits
/// CX b c, a replay of the 2^n + 2^(n+1) - 2 gates lowered before it, and
/// CX b c again.
pub fn lower_path(path: &TransformationPath) -> Vec<Gate> {
    let mut gates: Vec<Gate> = Vec::with_capacity(path.num_gates());
    let mut cascades = 0u32;
    for step in path.steps() {
        if step.kind == StepKind::Cnot3 && cascades > 0 {
            let replay = replay_len(cascades).min(gates.len());
            let start = gates.len() - replay;
            let bc = Cx(B, C).gate(step);
            gates.push(bc.clone());
            gates.extend_from_within(start..start + replay);
            gates.push(bc);
            cascades += 1;
            continue;
        }
        if step.kind == StepKind::Cnot3 {
            cascades += 1;
        }
        gates.extend(primitives(step.kind).iter().map(|p| p.gate(step)));
    }
    gates
}

/// Rewrite `circuit` so that every CNOT runs on a native edge of `target`.
///
/// Single-qubit gates and NOTs pass through. A CNOT(c, t) is replaced by the
/// lowering of the table path for (c, t). A control firing on |0⟩ is lowered
/// between two NOTs on the control line. The output has one line per
/// physical qubit; lines the circuit does not have are appended as `i<k>` /
/// `o<k>`. The input is not modified.
#[instrument(skip_all, fields(circuit = circuit.name()))]
pub fn expand(circuit: &Circuit, target: &Target) -> CompileResult<Circuit> {
    let n = target.num_qubits();
    if circuit.num_qubits() > n {
        return Err(CompileError::CircuitTooLarge {
            required: circuit.num_qubits(),
            available: n,
        });
    }

    let mut out = circuit.empty_like();
    for k in circuit.num_qubits()..n {
        out.add_line(format!("i{k}"), format!("o{k}"));
    }

    let mut lowered = 0usize;
    for (position, gate) in circuit.iter().enumerate() {
        let unsupported = || CompileError::UnsupportedGate {
            position,
            name: gate.name(),
        };
        let &[gate_target] = gate.targets.as_slice() else {
            return Err(unsupported());
        };

        match (&gate.kind, gate.controls.as_slice()) {
            (GateKind::Toffoli, [control]) => {
                let path = target.path(control.line.0, gate_target.0);
                if !control.polarity {
                    out.x(control.line)?;
                }
                for primitive in lower_path(path) {
                    out.append(primitive)?;
                }
                if !control.polarity {
                    out.x(control.line)?;
                }
                lowered += 1;
            }
            (
                GateKind::Toffoli
                | GateKind::Hadamard
                | GateKind::Pauli(_)
                | GateKind::Rotation { .. },
                [],
            ) => {
                out.append(gate.clone())?;
            }
            _ => return Err(unsupported()),
        }
    }

    debug!("Lowered {lowered} CNOTs");
    info!(
        "Expanded {} gates into {} on {} qubits",
        circuit.num_gates(),
        out.num_gates(),
        n
    );
    Ok(out)
}
