//! The decoder/dispatcher that steps a [`VmSession`] one instruction at a time.

use std::time::{SystemTime, UNIX_EPOCH};

use beast_program::{OpCode, VariableType};
use tracing::{debug, error, info, warn};

use crate::error::{VmError, VmResult};
use crate::session::{VariableIoBehavior, VmSession};

/// Severity of a message the decoder logs while stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Panic,
}

/// Decodes and dispatches one BEAST instruction per [`step`](CpuVirtualMachine::step) call.
///
/// Below-threshold log messages are discarded; the threshold is fixed at construction,
/// not mutated globally, so multiple VMs can run with independent verbosity.
pub struct CpuVirtualMachine {
    min_severity: MessageSeverity,
}

impl CpuVirtualMachine {
    pub fn new(min_severity: MessageSeverity) -> Self {
        Self { min_severity }
    }

    fn log(&self, severity: MessageSeverity, message: impl AsRef<str>) {
        if severity < self.min_severity {
            return;
        }
        let message = message.as_ref();
        match severity {
            MessageSeverity::Debug => debug!("{message}"),
            MessageSeverity::Info => info!("{message}"),
            MessageSeverity::Warning => warn!("{message}"),
            MessageSeverity::Error | MessageSeverity::Panic => error!("{message}"),
        }
    }

    /// Decodes one instruction and, unless `dry_run`, dispatches it to the session.
    ///
    /// Returns `Ok(true)` if the session can keep running, `Ok(false)` once it has
    /// terminated or reached the end of the program. A decode or operator failure marks
    /// the session abnormal and is returned as `Err`, matching the source's "abnormal exit
    /// ends the step loop but does not panic the host" policy.
    pub fn step(&self, session: &mut VmSession, dry_run: bool) -> VmResult<bool> {
        if session.is_at_end() {
            return Ok(false);
        }

        let instruction_address = session.cursor();
        let opcode_byte = match session.fetch1() {
            Ok(byte) => byte as u8,
            Err(err) => {
                self.log(MessageSeverity::Panic, format!("failed to fetch opcode: {err}"));
                session.mark_abnormal_exit();
                return Err(err);
            }
        };

        let opcode = match OpCode::try_from(opcode_byte) {
            Ok(opcode) => opcode,
            Err(byte) => {
                self.log(MessageSeverity::Panic, format!("undefined opcode {byte:#04x}"));
                session.mark_abnormal_exit();
                return Err(VmError::InvalidOpcode { opcode: byte });
            }
        };

        session.inform_about_step(opcode);
        self.log(MessageSeverity::Debug, format!("@{instruction_address}: {opcode:?}"));

        if let Err(err) = self.dispatch(session, opcode, instruction_address, dry_run) {
            self.log(MessageSeverity::Error, format!("operator {opcode:?} failed: {err}"));
            session.mark_abnormal_exit();
            return Err(err);
        }

        Ok(!session.is_at_end() && !session.was_terminated())
    }

    fn dispatch(
        &self,
        session: &mut VmSession,
        opcode: OpCode,
        instruction_address: usize,
        dry_run: bool,
    ) -> VmResult<()> {
        use OpCode::*;

        match opcode {
            NoOp => Ok(()),

            DeclareVariable => {
                let var = session.fetch4()?;
                let raw_type = session.fetch1()? as u8;
                if dry_run {
                    return Ok(());
                }
                let var_type = VariableType::try_from(raw_type).map_err(|byte| VmError::InvalidArgument {
                    reason: format!("undefined variable type {byte:#04x}"),
                })?;
                session.declare(var, var_type)
            }

            SetVariable => {
                let var = session.fetch4()?;
                let follow = self.fetch_flag(session)?;
                let value = session.fetch4()?;
                if dry_run {
                    return Ok(());
                }
                session.write(var, follow, value)
            }

            UndeclareVariable => {
                let var = session.fetch4()?;
                if dry_run {
                    return Ok(());
                }
                session.undeclare(var)
            }

            AddConstantToVariable => {
                let (var, follow, c) = self.fetch_var_follow_i32(session)?;
                if dry_run {
                    return Ok(());
                }
                session.add_constant_to_variable(var, follow, c)
            }

            AddVariableToVariable => {
                let (src, fs, dst, fd) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.add_variable_to_variable(src, fs, dst, fd)
            }

            SubtractConstantFromVariable => {
                let (var, follow, c) = self.fetch_var_follow_i32(session)?;
                if dry_run {
                    return Ok(());
                }
                session.subtract_constant_from_variable(var, follow, c)
            }

            SubtractVariableFromVariable => {
                let (src, fs, dst, fd) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.subtract_variable_from_variable(src, fs, dst, fd)
            }

            RelativeJumpToVariableAddressIfVariableGt0
            | RelativeJumpToVariableAddressIfVariableLt0
            | RelativeJumpToVariableAddressIfVariableEq0
            | AbsoluteJumpToVariableAddressIfVariableGt0
            | AbsoluteJumpToVariableAddressIfVariableLt0
            | AbsoluteJumpToVariableAddressIfVariableEq0 => {
                let cond = session.fetch4()?;
                let follow_cond = self.fetch_flag(session)?;
                let addr_var = session.fetch4()?;
                let follow_addr = self.fetch_flag(session)?;
                if dry_run {
                    return Ok(());
                }
                let cond_value = session.read(cond, follow_cond)?;
                if !Self::condition_holds(opcode, cond_value) {
                    return Ok(());
                }
                let addr = session.read(addr_var, follow_addr)?;
                let relative = matches!(
                    opcode,
                    RelativeJumpToVariableAddressIfVariableGt0
                        | RelativeJumpToVariableAddressIfVariableLt0
                        | RelativeJumpToVariableAddressIfVariableEq0
                );
                self.jump(session, addr, relative)
            }

            RelativeJumpIfVariableGt0
            | RelativeJumpIfVariableLt0
            | RelativeJumpIfVariableEq0
            | AbsoluteJumpIfVariableGt0
            | AbsoluteJumpIfVariableLt0
            | AbsoluteJumpIfVariableEq0 => {
                let cond = session.fetch4()?;
                let follow_cond = self.fetch_flag(session)?;
                let addr = session.fetch4()?;
                if dry_run {
                    return Ok(());
                }
                let cond_value = session.read(cond, follow_cond)?;
                if !Self::condition_holds(opcode, cond_value) {
                    return Ok(());
                }
                let relative = matches!(
                    opcode,
                    RelativeJumpIfVariableGt0 | RelativeJumpIfVariableLt0 | RelativeJumpIfVariableEq0
                );
                self.jump(session, addr, relative)
            }

            LoadMemorySizeIntoVariable => {
                let (var, follow) = self.fetch_var_follow(session)?;
                if dry_run {
                    return Ok(());
                }
                let declared = session.declared_variable_count() as i32;
                session.write(var, follow, declared)
            }

            CheckIfVariableIsInput => {
                let (src, fs, dst, fd) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                let is_input = session.get_variable_behavior(src, fs)? == VariableIoBehavior::Input;
                session.write(dst, fd, i32::from(is_input))
            }

            CheckIfVariableIsOutput => {
                let (src, fs, dst, fd) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                let is_output = session.get_variable_behavior(src, fs)? == VariableIoBehavior::Output;
                session.write(dst, fd, i32::from(is_output))
            }

            LoadInputCountIntoVariable => {
                let (var, follow) = self.fetch_var_follow(session)?;
                if dry_run {
                    return Ok(());
                }
                let count = session.count_variables_with_behavior(VariableIoBehavior::Input) as i32;
                session.write(var, follow, count)
            }

            LoadOutputCountIntoVariable => {
                let (var, follow) = self.fetch_var_follow(session)?;
                if dry_run {
                    return Ok(());
                }
                let count = session.count_variables_with_behavior(VariableIoBehavior::Output) as i32;
                session.write(var, follow, count)
            }

            LoadCurrentAddressIntoVariable => {
                let (var, follow) = self.fetch_var_follow(session)?;
                if dry_run {
                    return Ok(());
                }
                session.write(var, follow, instruction_address as i32)
            }

            PrintVariable => {
                let var = session.fetch4()?;
                let follow = self.fetch_flag(session)?;
                let as_char = self.fetch_flag(session)?;
                if dry_run {
                    return Ok(());
                }
                session.print_variable(var, follow, as_char)
            }

            SetStringTableEntry => {
                let idx = session.fetch4()?;
                let content = self.fetch_string(session)?;
                if dry_run {
                    return Ok(());
                }
                session.set_string_table_entry(idx, content)
            }

            PrintStringFromStringTable => {
                let idx = session.fetch4()?;
                if dry_run {
                    return Ok(());
                }
                let content = session.string_table_entry(idx)?.to_vec();
                session.print_string(&content)
            }

            LoadStringTableLimitIntoVariable => {
                let (var, follow) = self.fetch_var_follow(session)?;
                if dry_run {
                    return Ok(());
                }
                let limit = session.limits().string_table_count as i32;
                session.write(var, follow, limit)
            }

            Terminate => {
                let code = session.fetch1()?;
                if dry_run {
                    return Ok(());
                }
                session.terminate(code);
                Ok(())
            }

            CopyVariable => {
                let (src, fs, dst, fd) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.copy_variable(src, fs, dst, fd)
            }

            LoadStringItemLengthIntoVariable => {
                let string_idx = session.fetch4()?;
                let var = session.fetch4()?;
                let follow = self.fetch_flag(session)?;
                if dry_run {
                    return Ok(());
                }
                let length = session.string_table_entry(string_idx)?.len() as i32;
                session.write(var, follow, length)
            }

            LoadStringItemIntoVariables => {
                let string_idx = session.fetch4()?;
                let start_var = session.fetch4()?;
                let follow = self.fetch_flag(session)?;
                if dry_run {
                    return Ok(());
                }
                let content = session.string_table_entry(string_idx)?.to_vec();
                let base = session.resolve(start_var, follow)?;
                for (i, byte) in content.iter().enumerate() {
                    session.write(base + i as i32, false, *byte as i32)?;
                }
                Ok(())
            }

            PerformSystemCall => {
                let major = session.fetch1()?;
                let minor = session.fetch1()?;
                let var = session.fetch4()?;
                let follow = self.fetch_flag(session)?;
                if dry_run {
                    return Ok(());
                }
                let value = Self::evaluate_system_call(major, minor)?;
                session.write(var, follow, value)
            }

            BitShiftVariableLeft => {
                let (var, follow, places) = self.fetch_var_follow_i8(session)?;
                if dry_run {
                    return Ok(());
                }
                session.bit_shift_variable_left(var, follow, places)
            }

            BitShiftVariableRight => {
                let (var, follow, places) = self.fetch_var_follow_i8(session)?;
                if dry_run {
                    return Ok(());
                }
                session.bit_shift_variable_right(var, follow, places)
            }

            BitWiseInvertVariable => {
                let (var, follow) = self.fetch_var_follow(session)?;
                if dry_run {
                    return Ok(());
                }
                session.bit_wise_invert_variable(var, follow)
            }

            BitWiseAndTwoVariables => {
                let (a, fa, b, fb) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.bit_wise_and_two_variables(a, fa, b, fb)
            }

            BitWiseOrTwoVariables => {
                let (a, fa, b, fb) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.bit_wise_or_two_variables(a, fa, b, fb)
            }

            BitWiseXorTwoVariables => {
                let (a, fa, b, fb) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.bit_wise_xor_two_variables(a, fa, b, fb)
            }

            LoadRandomValueIntoVariable => {
                let (var, follow) = self.fetch_var_follow(session)?;
                if dry_run {
                    return Ok(());
                }
                session.load_random_value_into_variable(var, follow)
            }

            ModuloVariableByConstant => {
                let (var, follow, c) = self.fetch_var_follow_i32(session)?;
                if dry_run {
                    return Ok(());
                }
                session.modulo_variable_by_constant(var, follow, c)
            }

            ModuloVariableByVariable => {
                let (var, follow, modulus, follow_modulus) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.modulo_variable_by_variable(var, follow, modulus, follow_modulus)
            }

            RotateVariableLeft => {
                let (var, follow, places) = self.fetch_var_follow_i8(session)?;
                if dry_run {
                    return Ok(());
                }
                session.rotate_variable_left(var, follow, places)
            }

            RotateVariableRight => {
                let (var, follow, places) = self.fetch_var_follow_i8(session)?;
                if dry_run {
                    return Ok(());
                }
                session.rotate_variable_right(var, follow, places)
            }

            UnconditionalJumpToAbsoluteAddress => {
                let addr = session.fetch4()?;
                if dry_run {
                    return Ok(());
                }
                self.jump(session, addr, false)
            }

            UnconditionalJumpToAbsoluteVariableAddress => {
                let (var, follow) = self.fetch_var_follow(session)?;
                if dry_run {
                    return Ok(());
                }
                let addr = session.read(var, follow)?;
                self.jump(session, addr, false)
            }

            UnconditionalJumpToRelativeAddress => {
                let addr = session.fetch4()?;
                if dry_run {
                    return Ok(());
                }
                self.jump(session, addr, true)
            }

            UnconditionalJumpToRelativeVariableAddress => {
                let (var, follow) = self.fetch_var_follow(session)?;
                if dry_run {
                    return Ok(());
                }
                let addr = session.read(var, follow)?;
                self.jump(session, addr, true)
            }

            CheckIfInputWasSet => {
                let (var, follow, dst, follow_dst) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                let was_set = session.check_if_input_was_set(var, follow)?;
                session.write(dst, follow_dst, i32::from(was_set))
            }

            LoadStringTableItemLengthLimitIntoVariable => {
                let (var, follow) = self.fetch_var_follow(session)?;
                if dry_run {
                    return Ok(());
                }
                let limit = session.limits().max_string_size as i32;
                session.write(var, follow, limit)
            }

            PushVariableOnStack => {
                let (stack, fs, var, fv) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.push_variable_on_stack(stack, fs, var, fv)
            }

            PushConstantOnStack => {
                let (stack, fs, c) = self.fetch_var_follow_i32(session)?;
                if dry_run {
                    return Ok(());
                }
                session.push_constant_on_stack(stack, fs, c)
            }

            PopVariableFromStack => {
                let (stack, fs, var, fv) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.pop_variable_from_stack(stack, fs, var, fv)
            }

            PopFromStack => {
                let (stack, fs) = self.fetch_var_follow(session)?;
                if dry_run {
                    return Ok(());
                }
                session.pop_from_stack(stack, fs)
            }

            CheckIfStackIsEmpty => {
                let (stack, fs, var, fv) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.check_if_stack_is_empty(stack, fs, var, fv)
            }

            SwapVariables => {
                let (a, fa, b, fb) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.swap_variables(a, fa, b, fb)
            }

            SetVariableStringTableEntry => {
                let var = session.fetch4()?;
                let follow = self.fetch_flag(session)?;
                let content = self.fetch_string(session)?;
                if dry_run {
                    return Ok(());
                }
                let idx = session.read(var, follow)?;
                session.set_string_table_entry(idx, content)
            }

            PrintVariableStringFromStringTable => {
                let (var, follow) = self.fetch_var_follow(session)?;
                if dry_run {
                    return Ok(());
                }
                let idx = session.read(var, follow)?;
                let content = session.string_table_entry(idx)?.to_vec();
                session.print_string(&content)
            }

            LoadVariableStringItemLengthIntoVariable => {
                let (string_var, fs, var, fv) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                let idx = session.read(string_var, fs)?;
                let length = session.string_table_entry(idx)?.len() as i32;
                session.write(var, fv, length)
            }

            LoadVariableStringItemIntoVariables => {
                let (string_var, fs, start_var, fv) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                let idx = session.read(string_var, fs)?;
                let content = session.string_table_entry(idx)?.to_vec();
                let base = session.resolve(start_var, fv)?;
                for (i, byte) in content.iter().enumerate() {
                    session.write(base + i as i32, false, *byte as i32)?;
                }
                Ok(())
            }

            TerminateWithVariableReturnCode => {
                let (var, follow) = self.fetch_var_follow(session)?;
                if dry_run {
                    return Ok(());
                }
                let code = session.read(var, follow)? as i8;
                session.terminate(code);
                Ok(())
            }

            VariableBitShiftVariableLeft => {
                let (var, fv, places_var, fp) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.variable_bit_shift_variable_left(var, fv, places_var, fp)
            }

            VariableBitShiftVariableRight => {
                let (var, fv, places_var, fp) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.variable_bit_shift_variable_right(var, fv, places_var, fp)
            }

            VariableRotateVariableLeft => {
                let (var, fv, places_var, fp) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.variable_rotate_variable_left(var, fv, places_var, fp)
            }

            VariableRotateVariableRight => {
                let (var, fv, places_var, fp) = self.fetch_two_vars(session)?;
                if dry_run {
                    return Ok(());
                }
                session.variable_rotate_variable_right(var, fv, places_var, fp)
            }

            CompareIfVariableGtConstant => {
                let (var, follow, c, target, follow_target) = self.fetch_compare_constant(session)?;
                if dry_run {
                    return Ok(());
                }
                session.compare_if_variable_gt_constant(var, follow, c, target, follow_target)
            }

            CompareIfVariableLtConstant => {
                let (var, follow, c, target, follow_target) = self.fetch_compare_constant(session)?;
                if dry_run {
                    return Ok(());
                }
                session.compare_if_variable_lt_constant(var, follow, c, target, follow_target)
            }

            CompareIfVariableEqConstant => {
                let (var, follow, c, target, follow_target) = self.fetch_compare_constant(session)?;
                if dry_run {
                    return Ok(());
                }
                session.compare_if_variable_eq_constant(var, follow, c, target, follow_target)
            }

            CompareIfVariableGtVariable => {
                let (a, fa, b, fb, target, follow_target) = self.fetch_compare_variable(session)?;
                if dry_run {
                    return Ok(());
                }
                session.compare_if_variable_gt_variable(a, fa, b, fb, target, follow_target)
            }

            CompareIfVariableLtVariable => {
                let (a, fa, b, fb, target, follow_target) = self.fetch_compare_variable(session)?;
                if dry_run {
                    return Ok(());
                }
                session.compare_if_variable_lt_variable(a, fa, b, fb, target, follow_target)
            }

            CompareIfVariableEqVariable => {
                let (a, fa, b, fb, target, follow_target) = self.fetch_compare_variable(session)?;
                if dry_run {
                    return Ok(());
                }
                session.compare_if_variable_eq_variable(a, fa, b, fb, target, follow_target)
            }

            GetMaxOfVariableAndConstant => {
                let (var, follow, c, target, follow_target) = self.fetch_compare_constant(session)?;
                if dry_run {
                    return Ok(());
                }
                session.get_max_of_variable_and_constant(var, follow, c, target, follow_target)
            }

            GetMinOfVariableAndConstant => {
                let (var, follow, c, target, follow_target) = self.fetch_compare_constant(session)?;
                if dry_run {
                    return Ok(());
                }
                session.get_min_of_variable_and_constant(var, follow, c, target, follow_target)
            }

            GetMaxOfVariableAndVariable => {
                let (a, fa, b, fb, target, follow_target) = self.fetch_compare_variable(session)?;
                if dry_run {
                    return Ok(());
                }
                session.get_max_of_variable_and_variable(a, fa, b, fb, target, follow_target)
            }

            GetMinOfVariableAndVariable => {
                let (a, fa, b, fb, target, follow_target) = self.fetch_compare_variable(session)?;
                if dry_run {
                    return Ok(());
                }
                session.get_min_of_variable_and_variable(a, fa, b, fb, target, follow_target)
            }
        }
    }

    // --- shared payload readers -------------------------------------------------

    fn fetch_flag(&self, session: &mut VmSession) -> VmResult<bool> {
        Ok(session.fetch1()? != 0)
    }

    fn fetch_string(&self, session: &mut VmSession) -> VmResult<Vec<u8>> {
        let len = session.fetch2()? as usize;
        let mut bytes = Vec::with_capacity(len);
        for _ in 0..len {
            bytes.push(session.fetch1()? as u8);
        }
        Ok(bytes)
    }

    fn fetch_var_follow(&self, session: &mut VmSession) -> VmResult<(i32, bool)> {
        let var = session.fetch4()?;
        let follow = self.fetch_flag(session)?;
        Ok((var, follow))
    }

    fn fetch_var_follow_i32(&self, session: &mut VmSession) -> VmResult<(i32, bool, i32)> {
        let (var, follow) = self.fetch_var_follow(session)?;
        let c = session.fetch4()?;
        Ok((var, follow, c))
    }

    fn fetch_var_follow_i8(&self, session: &mut VmSession) -> VmResult<(i32, bool, i8)> {
        let (var, follow) = self.fetch_var_follow(session)?;
        let places = session.fetch1()?;
        Ok((var, follow, places))
    }

    fn fetch_two_vars(&self, session: &mut VmSession) -> VmResult<(i32, bool, i32, bool)> {
        let (a, fa) = self.fetch_var_follow(session)?;
        let (b, fb) = self.fetch_var_follow(session)?;
        Ok((a, fa, b, fb))
    }

    fn fetch_compare_constant(&self, session: &mut VmSession) -> VmResult<(i32, bool, i32, i32, bool)> {
        let (var, follow) = self.fetch_var_follow(session)?;
        let c = session.fetch4()?;
        let (target, follow_target) = self.fetch_var_follow(session)?;
        Ok((var, follow, c, target, follow_target))
    }

    fn fetch_compare_variable(&self, session: &mut VmSession) -> VmResult<(i32, bool, i32, bool, i32, bool)> {
        let (a, fa, b, fb) = self.fetch_two_vars(session)?;
        let (target, follow_target) = self.fetch_var_follow(session)?;
        Ok((a, fa, b, fb, target, follow_target))
    }

    fn condition_holds(opcode: OpCode, value: i32) -> bool {
        use OpCode::*;
        match opcode {
            RelativeJumpToVariableAddressIfVariableGt0
            | AbsoluteJumpToVariableAddressIfVariableGt0
            | RelativeJumpIfVariableGt0
            | AbsoluteJumpIfVariableGt0 => value > 0,
            RelativeJumpToVariableAddressIfVariableLt0
            | AbsoluteJumpToVariableAddressIfVariableLt0
            | RelativeJumpIfVariableLt0
            | AbsoluteJumpIfVariableLt0 => value < 0,
            _ => value == 0,
        }
    }

    fn jump(&self, session: &mut VmSession, addr: i32, relative: bool) -> VmResult<()> {
        let program_size = session.program().size();
        let target = if relative {
            session.cursor() as i64 + addr as i64
        } else {
            addr as i64
        };
        if target < 0 || target > program_size as i64 {
            return Err(VmError::InvalidJump { target, program_size });
        }
        session.set_cursor(target as usize);
        Ok(())
    }

    /// `major = 0`: date/time injection. `minor` selects which field of the current local
    /// time (treated as UTC, since no timezone database is part of this crate's stack) is
    /// returned.
    fn evaluate_system_call(major: i8, minor: i8) -> VmResult<i32> {
        if major != 0 || !(0..=8).contains(&minor) {
            return Err(VmError::InvalidSystemCall { major, minor });
        }
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is after the Unix epoch");
        let total_seconds = now.as_secs() as i64;
        let days = total_seconds.div_euclid(86_400);
        let seconds_of_day = total_seconds.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(days);
        let hour = seconds_of_day / 3600;
        let minute = (seconds_of_day % 3600) / 60;
        let second = seconds_of_day % 60;
        // 1970-01-01 was a Thursday (weekday index 4 with Monday = 0).
        let weekday = (days.rem_euclid(7) + 4).rem_euclid(7);

        Ok(match minor {
            0 => 0,      // tz-hour-offset: this crate operates in UTC only.
            1 => 0,      // tz-minute-offset
            2 => second as i32,
            3 => minute as i32,
            4 => hour as i32,
            5 => day as i32,
            6 => month as i32,
            7 => year as i32,
            8 => weekday as i32,
            _ => unreachable!("minor range checked above"),
        })
    }
}

/// Howard Hinnant's `civil_from_days`: days since the Unix epoch to a `(year, month, day)`
/// Gregorian calendar date, without pulling in a timezone/calendar crate.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as i64;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as i64;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use beast_config::SessionLimits;
    use beast_program::Program;

    fn session_with(program: Program) -> VmSession {
        VmSession::new(program, SessionLimits::default())
    }

    #[test]
    fn civil_from_days_matches_known_epoch() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(19_723), (2024, 1, 1));
    }

    #[test]
    fn noop_advances_cursor_and_continues() {
        let mut program = Program::new_growing();
        program.no_op().unwrap();
        program.no_op().unwrap();
        let mut session = session_with(program);
        let vm = CpuVirtualMachine::new(MessageSeverity::Debug);
        assert!(vm.step(&mut session, false).unwrap());
        assert_eq!(session.cursor(), 1);
    }

    #[test]
    fn terminate_stops_and_retains_return_code() {
        let mut program = Program::new_growing();
        program.terminate(42).unwrap();
        let mut session = session_with(program);
        let vm = CpuVirtualMachine::new(MessageSeverity::Debug);
        assert!(!vm.step(&mut session, false).unwrap());
        assert_eq!(session.statistics().return_code(), 42);
    }

    #[test]
    fn undefined_opcode_marks_abnormal() {
        let mut program = Program::new_growing();
        program.append1(0xff).unwrap();
        let mut session = session_with(program);
        let vm = CpuVirtualMachine::new(MessageSeverity::Debug);
        assert!(vm.step(&mut session, false).is_err());
        assert!(session.statistics().abnormal_exit());
    }

    #[test]
    fn jump_outside_program_bounds_is_invalid() {
        let mut program = Program::new_growing();
        program.unconditional_jump_to_absolute_address(1000).unwrap();
        let mut session = session_with(program);
        let vm = CpuVirtualMachine::new(MessageSeverity::Debug);
        assert!(matches!(vm.step(&mut session, false), Err(VmError::InvalidJump { .. })));
    }

    #[test]
    fn dry_run_advances_without_side_effects() {
        let mut program = Program::new_growing();
        program.declare_variable(0, VariableType::Int32).unwrap();
        program.no_op().unwrap();
        let mut session = session_with(program);
        let vm = CpuVirtualMachine::new(MessageSeverity::Debug);
        assert!(vm.step(&mut session, true).unwrap());
        assert!(session.read(0, false).is_err(), "dry run must not declare the variable");
    }

    #[test]
    fn dry_run_does_not_validate_declare_variable_type_byte() {
        let mut program = Program::new_growing();
        program.append_opcode(OpCode::DeclareVariable).unwrap();
        program.append4(0).unwrap();
        program.append1(0xff).unwrap();
        program.no_op().unwrap();
        let mut session = session_with(program);
        let vm = CpuVirtualMachine::new(MessageSeverity::Debug);
        assert!(vm.step(&mut session, true).unwrap(), "a malformed type byte must not abort a dry run");
    }
}
