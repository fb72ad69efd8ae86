#[cfg(test)]
mod tests {
    /// Frozen opcode table. Programs in the wild depend on every entry, so a
    /// change here is a breaking change to the instruction set.
    const EXPECTED_ISA: &str = "\
        Add=1 ADD [Read Read Write] Arithmetic\n\
        Mul=2 MUL [Read Read Write] Arithmetic\n\
        In=3 IN [Write] Input\n\
        Out=4 OUT [Read] Output\n\
        JumpIfTrue=5 JNZ [Read Read] Jump\n\
        JumpIfFalse=6 JZ [Read Read] Jump\n\
        LessThan=7 LT [Read Read Write] Compare\n\
        Equals=8 EQ [Read Read Write] Compare\n\
        AdjustRelativeBase=9 ARB [Read] Base\n\
        Halt=99 HALT [] Halt\n";

    macro_rules! render_isa {
        (
            $(
                $(#[$doc:meta])*
                $name:ident = $opcode:literal, $mnemonic:literal => [
                    $( $field:ident : $kind:ident ),* $(,)?
                ], $category:ident
            ),* $(,)?
        ) => {{
            let mut out = String::new();
            $(
                let kinds: &[&str] = &[$( stringify!($kind) ),*];
                out.push_str(&format!(
                    "{}={} {} [{}] {}\n",
                    stringify!($name),
                    $opcode,
                    $mnemonic,
                    kinds.join(" "),
                    stringify!($category),
                ));
            )*
            out
        }};
    }

    fn current_isa() -> String {
        crate::for_each_instruction!(render_isa)
    }

    #[test]
    #[ignore]
    fn print_isa() {
        print!("{}", current_isa());
    }

    #[test]
    fn isa_unchanged() {
        assert_eq!(current_isa(), EXPECTED_ISA);
    }
}
