//! Assembly text sink: tracks indentation depth and writes one line at a
//! time. Mirrors the emitter the source this was distilled from builds
//! around a `TextIO` — here the sink is an owned `String` buffer instead,
//! since the driver writes the whole module out in one shot (see
//! `indentc-drv`).

const INDENT_STEP: usize = 4;

pub struct Emitter {
    output: String,
    depth: usize,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter {
            output: String::new(),
            depth: 0,
        }
    }

    pub fn into_output(self) -> String {
        self.output
    }

    /// Emits `name:` at column zero, regardless of current depth.
    pub fn label(&mut self, name: &str) {
        self.output.push_str(name);
        self.output.push_str(":\n");
    }

    /// Emits an indented, comma-joined instruction.
    pub fn instruction(&mut self, mnemonic: &str, operands: &[&str]) {
        self.write_indent();
        self.output.push_str(mnemonic);
        if !operands.is_empty() {
            self.output.push(' ');
            self.output.push_str(&operands.join(", "));
        }
        self.output.push('\n');
    }

    pub fn push_stack(&mut self, reg: &str) {
        self.instruction("push", &[reg]);
    }

    pub fn pop_stack(&mut self, reg: &str) {
        self.instruction("pop", &[reg]);
    }

    /// Emits `name:`, then the standard `push %rbp; mov %rsp, %rbp`
    /// prologue, and increases depth for the function's body.
    pub fn enter_function(&mut self, name: &str) {
        self.label(name);
        self.depth += 1;
        self.push_stack("%rbp");
        self.instruction("mov", &["%rsp", "%rbp"]);
    }

    /// Emits the `mov %rbp, %rsp; pop %rbp; ret` epilogue text, without
    /// touching `depth`. A function body can return from several places
    /// (a bare trailing `Return`, or one nested inside an `if`/`while`), and
    /// each needs this text; the function's indentation depth must still
    /// unwind exactly once, at the true end of the function — see
    /// `exit_function`.
    pub fn emit_epilogue(&mut self) {
        self.instruction("mov", &["%rbp", "%rsp"]);
        self.pop_stack("%rbp");
        self.instruction("ret", &[]);
    }

    /// Emits the epilogue text and restores depth. Call exactly once per
    /// function, after its body has been fully lowered — mid-body `return`s
    /// use `emit_epilogue` instead so `depth` only unwinds once.
    pub fn exit_function(&mut self) {
        self.emit_epilogue();
        self.depth -= 1;
    }

    /// Restores depth without emitting any epilogue text, for the case
    /// where the function body's last statement already emitted its own
    /// (via `emit_epilogue`) and a second one would be dead code.
    pub fn leave_function_scope(&mut self) {
        self.depth -= 1;
    }

    fn write_indent(&mut self) {
        for _ in 0..self.depth * INDENT_STEP {
            self.output.push(' ');
        }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Emitter::new()
    }
}
