//! WASM API for the LS-8 emulator.
//!
//! Provides JavaScript-callable interfaces for program loading, execution,
//! state inspection and disassembly.

use crate::disassembler::{disassemble, format_instruction};
use crate::{loader, CallbackOutput, FlatMemory, MemoryBus, CPU, LOAD_ADDRESS};
use wasm_bindgen::prelude::*;

type JsOutput = CallbackOutput<Box<dyn FnMut(&str)>>;

/// JavaScript-compatible error wrapper
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsError {
    message: String,
}

#[wasm_bindgen]
impl JsError {
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str) -> JsError {
        JsError {
            message: message.to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

/// One line of disassembly
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct DisassemblyLine {
    address: u8,
    bytes: Vec<u8>,
    text: String,
}

#[wasm_bindgen]
impl DisassemblyLine {
    #[wasm_bindgen(getter)]
    pub fn address(&self) -> u8 {
        self.address
    }

    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String {
        self.text.clone()
    }
}

fn js_output(on_output: &js_sys::Function) -> JsOutput {
    let callback = on_output.clone();
    CallbackOutput::new(Box::new(move |text: &str| {
        let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(text));
    }))
}

/// Main emulator interface for JavaScript
#[wasm_bindgen]
pub struct Ls8Emulator {
    cpu: CPU<FlatMemory, JsOutput>,
    on_output: js_sys::Function,
}

#[wasm_bindgen]
impl Ls8Emulator {
    /// Create an emulator whose PRN/PRA output is passed to `on_output`
    #[wasm_bindgen(constructor)]
    pub fn new(on_output: js_sys::Function) -> Self {
        Ls8Emulator {
            cpu: CPU::new(FlatMemory::new(), js_output(&on_output)),
            on_output,
        }
    }

    /// Parse `.ls8` source and load it at address 0 into a fresh machine
    pub fn load_program(&mut self, source: &str) -> Result<usize, JsError> {
        let bytes = loader::parse_program(source).map_err(|e| JsError::new(&e.to_string()))?;
        self.cpu = CPU::new(FlatMemory::new(), js_output(&self.on_output));
        self.cpu
            .load_program(LOAD_ADDRESS, &bytes)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(bytes.len())
    }

    /// Execute a single instruction; returns true once halted
    pub fn step(&mut self) -> Result<bool, JsError> {
        self.cpu
            .step()
            .map(|_| self.cpu.is_halted())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Execute up to `max_steps` instructions and return how many ran
    pub fn run(&mut self, max_steps: u32) -> Result<u32, JsError> {
        self.cpu
            .run_for(max_steps as u64)
            .map(|n| n as u32)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Reset registers and PC, keeping the loaded program
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    /// Raise hardware interrupt `n` (0-7)
    pub fn request_interrupt(&mut self, n: u8) -> Result<(), JsError> {
        self.cpu
            .request_interrupt(n)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn pc(&self) -> u8 {
        self.cpu.pc()
    }

    #[wasm_bindgen(getter)]
    pub fn sp(&self) -> u8 {
        self.cpu.sp()
    }

    #[wasm_bindgen(getter)]
    pub fn halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// Flags packed as 0b00000LGE
    #[wasm_bindgen(getter)]
    pub fn flags(&self) -> u8 {
        self.cpu.flags().to_byte()
    }

    #[wasm_bindgen(getter)]
    pub fn instructions(&self) -> f64 {
        self.cpu.instructions_executed() as f64 // Convert u64 to f64 for JavaScript
    }

    /// R0-R7
    pub fn registers(&self) -> Vec<u8> {
        self.cpu.registers().to_vec()
    }

    /// Read a single byte from memory
    pub fn read_memory(&self, addr: u8) -> u8 {
        self.cpu.memory().read(addr)
    }

    /// The whole 256-byte address space
    pub fn memory(&self) -> Vec<u8> {
        self.cpu.memory().as_slice().to_vec()
    }

    /// Disassemble `len` bytes of memory starting at `start`
    pub fn disassemble(&self, start: u8, len: u16) -> Vec<JsValue> {
        let end = (start as usize + len as usize).min(crate::MEMORY_SIZE);
        let bytes = &self.cpu.memory().as_slice()[start as usize..end];

        disassemble(bytes, start)
            .iter()
            .map(|line| {
                JsValue::from(DisassemblyLine {
                    address: line.address,
                    bytes: line.bytes(),
                    text: format_instruction(line),
                })
            })
            .collect()
    }
}
