//! Interpreter for the RV32 subset the code generator emits
//!
//! Executes assembly text directly: labels are resolved to line indices and
//! `ra` holds the index to return to. A `ret` to [`HALT`] ends the run.

#![allow(dead_code)]

use std::collections::HashMap;

const RVABI: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2",
    "s0", "s1", "a0", "a1", "a2", "a3", "a4", "a5",
    "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7",
    "s8", "s9", "s10", "s11", "t3", "t4", "t5", "t6",
];

pub const MEM_SIZE: usize = 1 << 16;
pub const HALT: i32 = -1;
const STEP_LIMIT: usize = 5_000_000;

type Extern = fn(&[i32; 6]) -> i32;

#[derive(Debug, Clone)]
struct Inst {
    op: String,
    args: Vec<String>,
}

pub struct Cpu {
    regs: [i32; 32],
    pc: usize,
    mem: Vec<u8>,
    program: Vec<Inst>,
    labels: HashMap<String, usize>,
    externs: HashMap<String, Extern>,
    pub steps: usize,
}

fn reg_index(name: &str) -> usize {
    let name = if name == "fp" { "s0" } else { name };
    match RVABI.iter().position(|&x| x == name) {
        Some(i) => i,
        None => panic!("Invalid register {}", name),
    }
}

/// `off(reg)` memory operand
fn mem_operand(text: &str) -> (i32, usize) {
    let open = text.find('(').unwrap_or_else(|| panic!("bad memory operand {text}"));
    let offset: i32 = text[..open].parse().unwrap();
    assert!((-2048..=2047).contains(&offset), "offset {offset} does not fit 12 bits");
    let reg = reg_index(text[open + 1..].trim_end_matches(')'));
    (offset, reg)
}

impl Cpu {
    pub fn new(asm: &str) -> Self {
        let mut program = Vec::new();
        let mut labels = HashMap::new();

        for line in asm.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('.') && !line.ends_with(':') {
                continue;
            }
            if let Some(label) = line.strip_suffix(':') {
                let previous = labels.insert(label.to_string(), program.len());
                assert!(previous.is_none(), "duplicate label {label}");
                continue;
            }

            let (op, rest) = line.split_once(' ').unwrap_or((line, ""));
            let args = rest
                .split(',')
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
            program.push(Inst {
                op: op.to_string(),
                args,
            });
        }

        Self {
            regs: [0; 32],
            pc: 0,
            mem: vec![0; MEM_SIZE],
            program,
            labels,
            externs: HashMap::new(),
            steps: 0,
        }
    }

    /// Provide a routine for calls to labels the program does not define
    pub fn with_extern(mut self, name: &str, f: Extern) -> Self {
        self.externs.insert(name.to_string(), f);
        self
    }

    pub fn reg(&self, r: &str) -> i32 {
        self.regs[reg_index(r)]
    }

    fn set(&mut self, r: &str, value: i32) {
        let i = reg_index(r);
        if i != 0 {
            self.regs[i] = value;
        }
    }

    fn load(&self, addr: i32) -> i32 {
        let a = addr as usize;
        assert!(addr >= 0 && a % 4 == 0 && a + 4 <= MEM_SIZE, "bad load at {addr}");
        i32::from_le_bytes(self.mem[a..a + 4].try_into().unwrap())
    }

    fn store(&mut self, addr: i32, value: i32) {
        let a = addr as usize;
        assert!(addr >= 0 && a % 4 == 0 && a + 4 <= MEM_SIZE, "bad store at {addr}");
        self.mem[a..a + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn target(&self, label: &str) -> usize {
        match self.labels.get(label) {
            Some(&i) => i,
            None => panic!("undefined label {}", label),
        }
    }

    /// Call `entry` with the given arguments and return `a0`
    pub fn call(&mut self, entry: &str, args: &[i32]) -> i32 {
        self.regs = [0; 32];
        self.set("sp", MEM_SIZE as i32);
        self.set("ra", HALT);
        for (i, value) in args.iter().enumerate() {
            self.set(&format!("a{i}"), *value);
        }
        self.pc = self.target(entry);

        loop {
            self.steps += 1;
            assert!(self.steps < STEP_LIMIT, "step limit exceeded");
            if !self.step() {
                return self.reg("a0");
            }
        }
    }

    pub fn run(&mut self) -> i32 {
        self.call("main", &[])
    }

    /// Execute one instruction; false once control returns to [`HALT`]
    fn step(&mut self) -> bool {
        let inst = self.program[self.pc].clone();
        let a = &inst.args;
        self.pc += 1;

        let r = |cpu: &Self, i: usize| cpu.reg(&a[i]);
        let imm = |i: usize| -> i32 { a[i].parse::<i64>().unwrap() as i32 };
        let imm12 = |i: usize| -> i32 {
            let v: i64 = a[i].parse().unwrap();
            assert!((-2048..=2047).contains(&v), "immediate {v} does not fit 12 bits");
            v as i32
        };

        match inst.op.as_str() {
            "li" => self.set(&a[0], imm(1)),
            "addi" => {
                let v = r(self, 1).wrapping_add(imm12(2));
                self.set(&a[0], v);
            }
            "mv" => {
                let v = r(self, 1);
                self.set(&a[0], v);
            }
            "neg" => {
                let v = r(self, 1).wrapping_neg();
                self.set(&a[0], v);
            }
            "add" | "sub" | "mul" | "div" | "xor" | "slt" => {
                let (x, y) = (r(self, 1), r(self, 2));
                let v = match inst.op.as_str() {
                    "add" => x.wrapping_add(y),
                    "sub" => x.wrapping_sub(y),
                    "mul" => x.wrapping_mul(y),
                    "div" => {
                        if y == 0 {
                            -1
                        } else {
                            x.wrapping_div(y)
                        }
                    }
                    "xor" => x ^ y,
                    _ => i32::from(x < y),
                };
                self.set(&a[0], v);
            }
            "xori" => {
                let v = r(self, 1) ^ imm12(2);
                self.set(&a[0], v);
            }
            "seqz" => {
                let v = i32::from(r(self, 1) == 0);
                self.set(&a[0], v);
            }
            "snez" => {
                let v = i32::from(r(self, 1) != 0);
                self.set(&a[0], v);
            }
            "lw" => {
                let (offset, base) = mem_operand(&a[1]);
                let v = self.load(self.regs[base].wrapping_add(offset));
                self.set(&a[0], v);
            }
            "sw" => {
                let (offset, base) = mem_operand(&a[1]);
                let addr = self.regs[base].wrapping_add(offset);
                let v = r(self, 0);
                self.store(addr, v);
            }
            "j" => self.pc = self.target(&a[0]),
            "beqz" => {
                if r(self, 0) == 0 {
                    self.pc = self.target(&a[1]);
                }
            }
            "call" => {
                if let Some(&i) = self.labels.get(&a[0]) {
                    self.set("ra", self.pc as i32);
                    self.pc = i;
                } else {
                    let f = *self
                        .externs
                        .get(&a[0])
                        .unwrap_or_else(|| panic!("undefined function {}", a[0]));
                    let args = [
                        self.reg("a0"),
                        self.reg("a1"),
                        self.reg("a2"),
                        self.reg("a3"),
                        self.reg("a4"),
                        self.reg("a5"),
                    ];
                    self.set("a0", f(&args));
                }
            }
            "ret" => {
                let ra = self.reg("ra");
                if ra == HALT {
                    return false;
                }
                self.pc = ra as usize;
            }
            other => panic!("unsupported instruction {}", other),
        }

        true
    }
}

/// Compile `source` with the default pipeline and run its `main`
pub fn compile_and_run(source: &str) -> i32 {
    let asm = rvcc::compile(source).unwrap_or_else(|e| panic!("{source}: {e}"));
    Cpu::new(&asm).run()
}
