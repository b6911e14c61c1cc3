// tarn - A small garbage-collected expression language
// Copyright (c) 2026 The tarn developers. MIT licensed.

use std::process;
use std::rc::Rc;

use tarn_core::Expression;
use tarn_core::Symbol;
use tarn_core::expr::{block, call, debug_print, declare, if_, integer, lambda, nil, variable};
use tarn_vm::{ProgramCounter, VirtualMachine, compile};

fn main() {
    // RUST_LOG=trace shows every bytecode step.
    env_logger::init();

    let program = demo_program();
    let blob = Rc::new(compile(&program));
    println!("{}", blob);

    let mut vm = VirtualMachine::new(ProgramCounter::new(blob));
    if let Err(e) = vm.run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// A small program exercising prints, conditionals, declarations and calls.
fn demo_program() -> Expression {
    let x = Symbol::new("x");
    let f = Symbol::new("f");
    let a = Symbol::new("a");

    block(vec![
        debug_print(integer(124124)),
        debug_print(integer(7)),
        debug_print(if_(nil(), integer(11111), integer(222222))),
        declare(x.clone(), integer(55371)),
        debug_print(variable(x)),
        declare(
            f.clone(),
            lambda(vec![a.clone()], block(vec![debug_print(variable(a))])),
        ),
        call(variable(f.clone()), vec![integer(777777)]),
        call(variable(f), vec![integer(9999999999)]),
        debug_print(nil()),
    ])
}
