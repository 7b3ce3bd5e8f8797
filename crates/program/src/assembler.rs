//! One method per opcode: each validates its arguments, then appends the opcode byte
//! followed by the instruction's payload in the fixed order documented for it.

use crate::buffer::{Program, VariableType};
use crate::error::ProgramResult;
use crate::opcode::OpCode;

impl Program {
    pub fn no_op(&mut self) -> ProgramResult<()> {
        self.append_opcode(OpCode::NoOp)
    }

    pub fn declare_variable(&mut self, var: i32, var_type: VariableType) -> ProgramResult<()> {
        self.append_opcode(OpCode::DeclareVariable)?;
        self.append4(var)?;
        self.append1(var_type.into())
    }

    pub fn set_variable(&mut self, var: i32, follow: bool, value: i32) -> ProgramResult<()> {
        self.append_opcode(OpCode::SetVariable)?;
        self.append4(var)?;
        self.append_flag(follow)?;
        self.append4(value)
    }

    pub fn undeclare_variable(&mut self, var: i32) -> ProgramResult<()> {
        self.append_opcode(OpCode::UndeclareVariable)?;
        self.append4(var)
    }

    pub fn add_constant_to_variable(&mut self, var: i32, follow: bool, c: i32) -> ProgramResult<()> {
        self.append_opcode(OpCode::AddConstantToVariable)?;
        self.append4(var)?;
        self.append_flag(follow)?;
        self.append4(c)
    }

    pub fn add_variable_to_variable(
        &mut self,
        src: i32,
        follow_src: bool,
        dst: i32,
        follow_dst: bool,
    ) -> ProgramResult<()> {
        self.append_opcode(OpCode::AddVariableToVariable)?;
        self.append4(src)?;
        self.append_flag(follow_src)?;
        self.append4(dst)?;
        self.append_flag(follow_dst)
    }

    pub fn subtract_constant_from_variable(&mut self, var: i32, follow: bool, c: i32) -> ProgramResult<()> {
        self.append_opcode(OpCode::SubtractConstantFromVariable)?;
        self.append4(var)?;
        self.append_flag(follow)?;
        self.append4(c)
    }

    pub fn subtract_variable_from_variable(
        &mut self,
        src: i32,
        follow_src: bool,
        dst: i32,
        follow_dst: bool,
    ) -> ProgramResult<()> {
        self.append_opcode(OpCode::SubtractVariableFromVariable)?;
        self.append4(src)?;
        self.append_flag(follow_src)?;
        self.append4(dst)?;
        self.append_flag(follow_dst)
    }

    fn jump_to_variable_address(
        &mut self,
        opcode: OpCode,
        cond: i32,
        follow_cond: bool,
        addr: i32,
        follow_addr: bool,
    ) -> ProgramResult<()> {
        self.append_opcode(opcode)?;
        self.append4(cond)?;
        self.append_flag(follow_cond)?;
        self.append4(addr)?;
        self.append_flag(follow_addr)
    }

    pub fn relative_jump_to_variable_address_if_variable_gt_0(
        &mut self,
        cond: i32,
        follow_cond: bool,
        addr: i32,
        follow_addr: bool,
    ) -> ProgramResult<()> {
        self.jump_to_variable_address(
            OpCode::RelativeJumpToVariableAddressIfVariableGt0,
            cond,
            follow_cond,
            addr,
            follow_addr,
        )
    }

    pub fn relative_jump_to_variable_address_if_variable_lt_0(
        &mut self,
        cond: i32,
        follow_cond: bool,
        addr: i32,
        follow_addr: bool,
    ) -> ProgramResult<()> {
        self.jump_to_variable_address(
            OpCode::RelativeJumpToVariableAddressIfVariableLt0,
            cond,
            follow_cond,
            addr,
            follow_addr,
        )
    }

    pub fn relative_jump_to_variable_address_if_variable_eq_0(
        &mut self,
        cond: i32,
        follow_cond: bool,
        addr: i32,
        follow_addr: bool,
    ) -> ProgramResult<()> {
        self.jump_to_variable_address(
            OpCode::RelativeJumpToVariableAddressIfVariableEq0,
            cond,
            follow_cond,
            addr,
            follow_addr,
        )
    }

    pub fn absolute_jump_to_variable_address_if_variable_gt_0(
        &mut self,
        cond: i32,
        follow_cond: bool,
        addr: i32,
        follow_addr: bool,
    ) -> ProgramResult<()> {
        self.jump_to_variable_address(
            OpCode::AbsoluteJumpToVariableAddressIfVariableGt0,
            cond,
            follow_cond,
            addr,
            follow_addr,
        )
    }

    pub fn absolute_jump_to_variable_address_if_variable_lt_0(
        &mut self,
        cond: i32,
        follow_cond: bool,
        addr: i32,
        follow_addr: bool,
    ) -> ProgramResult<()> {
        self.jump_to_variable_address(
            OpCode::AbsoluteJumpToVariableAddressIfVariableLt0,
            cond,
            follow_cond,
            addr,
            follow_addr,
        )
    }

    pub fn absolute_jump_to_variable_address_if_variable_eq_0(
        &mut self,
        cond: i32,
        follow_cond: bool,
        addr: i32,
        follow_addr: bool,
    ) -> ProgramResult<()> {
        self.jump_to_variable_address(
            OpCode::AbsoluteJumpToVariableAddressIfVariableEq0,
            cond,
            follow_cond,
            addr,
            follow_addr,
        )
    }

    fn jump_if_variable(&mut self, opcode: OpCode, cond: i32, follow_cond: bool, addr: i32) -> ProgramResult<()> {
        self.append_opcode(opcode)?;
        self.append4(cond)?;
        self.append_flag(follow_cond)?;
        self.append4(addr)
    }

    pub fn relative_jump_if_variable_gt_0(&mut self, cond: i32, follow_cond: bool, addr: i32) -> ProgramResult<()> {
        self.jump_if_variable(OpCode::RelativeJumpIfVariableGt0, cond, follow_cond, addr)
    }

    pub fn relative_jump_if_variable_lt_0(&mut self, cond: i32, follow_cond: bool, addr: i32) -> ProgramResult<()> {
        self.jump_if_variable(OpCode::RelativeJumpIfVariableLt0, cond, follow_cond, addr)
    }

    pub fn relative_jump_if_variable_eq_0(&mut self, cond: i32, follow_cond: bool, addr: i32) -> ProgramResult<()> {
        self.jump_if_variable(OpCode::RelativeJumpIfVariableEq0, cond, follow_cond, addr)
    }

    pub fn absolute_jump_if_variable_gt_0(&mut self, cond: i32, follow_cond: bool, addr: i32) -> ProgramResult<()> {
        self.jump_if_variable(OpCode::AbsoluteJumpIfVariableGt0, cond, follow_cond, addr)
    }

    pub fn absolute_jump_if_variable_lt_0(&mut self, cond: i32, follow_cond: bool, addr: i32) -> ProgramResult<()> {
        self.jump_if_variable(OpCode::AbsoluteJumpIfVariableLt0, cond, follow_cond, addr)
    }

    pub fn absolute_jump_if_variable_eq_0(&mut self, cond: i32, follow_cond: bool, addr: i32) -> ProgramResult<()> {
        self.jump_if_variable(OpCode::AbsoluteJumpIfVariableEq0, cond, follow_cond, addr)
    }

    fn var_follow(&mut self, opcode: OpCode, var: i32, follow: bool) -> ProgramResult<()> {
        self.append_opcode(opcode)?;
        self.append4(var)?;
        self.append_flag(follow)
    }

    pub fn load_memory_size_into_variable(&mut self, var: i32, follow: bool) -> ProgramResult<()> {
        self.var_follow(OpCode::LoadMemorySizeIntoVariable, var, follow)
    }

    fn src_dst(&mut self, opcode: OpCode, src: i32, follow_src: bool, dst: i32, follow_dst: bool) -> ProgramResult<()> {
        self.append_opcode(opcode)?;
        self.append4(src)?;
        self.append_flag(follow_src)?;
        self.append4(dst)?;
        self.append_flag(follow_dst)
    }

    pub fn check_if_variable_is_input(
        &mut self,
        src: i32,
        follow_src: bool,
        dst: i32,
        follow_dst: bool,
    ) -> ProgramResult<()> {
        self.src_dst(OpCode::CheckIfVariableIsInput, src, follow_src, dst, follow_dst)
    }

    pub fn check_if_variable_is_output(
        &mut self,
        src: i32,
        follow_src: bool,
        dst: i32,
        follow_dst: bool,
    ) -> ProgramResult<()> {
        self.src_dst(OpCode::CheckIfVariableIsOutput, src, follow_src, dst, follow_dst)
    }

    pub fn load_input_count_into_variable(&mut self, var: i32, follow: bool) -> ProgramResult<()> {
        self.var_follow(OpCode::LoadInputCountIntoVariable, var, follow)
    }

    pub fn load_output_count_into_variable(&mut self, var: i32, follow: bool) -> ProgramResult<()> {
        self.var_follow(OpCode::LoadOutputCountIntoVariable, var, follow)
    }

    pub fn load_current_address_into_variable(&mut self, var: i32, follow: bool) -> ProgramResult<()> {
        self.var_follow(OpCode::LoadCurrentAddressIntoVariable, var, follow)
    }

    pub fn print_variable(&mut self, var: i32, follow: bool, as_char: bool) -> ProgramResult<()> {
        self.append_opcode(OpCode::PrintVariable)?;
        self.append4(var)?;
        self.append_flag(follow)?;
        self.append_flag(as_char)
    }

    pub fn set_string_table_entry(&mut self, idx: i32, content: &[u8]) -> ProgramResult<()> {
        self.append_opcode(OpCode::SetStringTableEntry)?;
        self.append4(idx)?;
        self.append_string(content)
    }

    pub fn print_string_from_string_table(&mut self, idx: i32) -> ProgramResult<()> {
        self.append_opcode(OpCode::PrintStringFromStringTable)?;
        self.append4(idx)
    }

    pub fn load_string_table_limit_into_variable(&mut self, var: i32, follow: bool) -> ProgramResult<()> {
        self.var_follow(OpCode::LoadStringTableLimitIntoVariable, var, follow)
    }

    pub fn terminate(&mut self, code: i8) -> ProgramResult<()> {
        self.append_opcode(OpCode::Terminate)?;
        self.append1(code as u8)
    }

    pub fn copy_variable(&mut self, src: i32, follow_src: bool, dst: i32, follow_dst: bool) -> ProgramResult<()> {
        self.src_dst(OpCode::CopyVariable, src, follow_src, dst, follow_dst)
    }

    pub fn load_string_item_length_into_variable(
        &mut self,
        string_idx: i32,
        var: i32,
        follow: bool,
    ) -> ProgramResult<()> {
        self.append_opcode(OpCode::LoadStringItemLengthIntoVariable)?;
        self.append4(string_idx)?;
        self.append4(var)?;
        self.append_flag(follow)
    }

    pub fn load_string_item_into_variables(
        &mut self,
        string_idx: i32,
        start_var: i32,
        follow: bool,
    ) -> ProgramResult<()> {
        self.append_opcode(OpCode::LoadStringItemIntoVariables)?;
        self.append4(string_idx)?;
        self.append4(start_var)?;
        self.append_flag(follow)
    }

    pub fn perform_system_call(&mut self, major: i8, minor: i8, var: i32, follow: bool) -> ProgramResult<()> {
        self.append_opcode(OpCode::PerformSystemCall)?;
        self.append1(major as u8)?;
        self.append1(minor as u8)?;
        self.append4(var)?;
        self.append_flag(follow)
    }

    fn shift_or_rotate(&mut self, opcode: OpCode, var: i32, follow: bool, places: i8) -> ProgramResult<()> {
        self.append_opcode(opcode)?;
        self.append4(var)?;
        self.append_flag(follow)?;
        self.append1(places as u8)
    }

    pub fn bit_shift_variable_left(&mut self, var: i32, follow: bool, places: i8) -> ProgramResult<()> {
        self.shift_or_rotate(OpCode::BitShiftVariableLeft, var, follow, places)
    }

    pub fn bit_shift_variable_right(&mut self, var: i32, follow: bool, places: i8) -> ProgramResult<()> {
        self.shift_or_rotate(OpCode::BitShiftVariableRight, var, follow, places)
    }

    pub fn bit_wise_invert_variable(&mut self, var: i32, follow: bool) -> ProgramResult<()> {
        self.var_follow(OpCode::BitWiseInvertVariable, var, follow)
    }

    fn a_b(&mut self, opcode: OpCode, a: i32, follow_a: bool, b: i32, follow_b: bool) -> ProgramResult<()> {
        self.append_opcode(opcode)?;
        self.append4(a)?;
        self.append_flag(follow_a)?;
        self.append4(b)?;
        self.append_flag(follow_b)
    }

    pub fn bit_wise_and_two_variables(&mut self, a: i32, follow_a: bool, b: i32, follow_b: bool) -> ProgramResult<()> {
        self.a_b(OpCode::BitWiseAndTwoVariables, a, follow_a, b, follow_b)
    }

    pub fn bit_wise_or_two_variables(&mut self, a: i32, follow_a: bool, b: i32, follow_b: bool) -> ProgramResult<()> {
        self.a_b(OpCode::BitWiseOrTwoVariables, a, follow_a, b, follow_b)
    }

    pub fn bit_wise_xor_two_variables(&mut self, a: i32, follow_a: bool, b: i32, follow_b: bool) -> ProgramResult<()> {
        self.a_b(OpCode::BitWiseXorTwoVariables, a, follow_a, b, follow_b)
    }

    pub fn load_random_value_into_variable(&mut self, var: i32, follow: bool) -> ProgramResult<()> {
        self.var_follow(OpCode::LoadRandomValueIntoVariable, var, follow)
    }

    pub fn modulo_variable_by_constant(&mut self, var: i32, follow: bool, c: i32) -> ProgramResult<()> {
        self.append_opcode(OpCode::ModuloVariableByConstant)?;
        self.append4(var)?;
        self.append_flag(follow)?;
        self.append4(c)
    }

    pub fn modulo_variable_by_variable(
        &mut self,
        var: i32,
        follow: bool,
        modulus: i32,
        follow_modulus: bool,
    ) -> ProgramResult<()> {
        self.append_opcode(OpCode::ModuloVariableByVariable)?;
        self.append4(var)?;
        self.append_flag(follow)?;
        self.append4(modulus)?;
        self.append_flag(follow_modulus)
    }

    pub fn rotate_variable_left(&mut self, var: i32, follow: bool, places: i8) -> ProgramResult<()> {
        self.shift_or_rotate(OpCode::RotateVariableLeft, var, follow, places)
    }

    pub fn rotate_variable_right(&mut self, var: i32, follow: bool, places: i8) -> ProgramResult<()> {
        self.shift_or_rotate(OpCode::RotateVariableRight, var, follow, places)
    }

    pub fn unconditional_jump_to_absolute_address(&mut self, addr: i32) -> ProgramResult<()> {
        self.append_opcode(OpCode::UnconditionalJumpToAbsoluteAddress)?;
        self.append4(addr)
    }

    pub fn unconditional_jump_to_absolute_variable_address(&mut self, var: i32, follow: bool) -> ProgramResult<()> {
        self.var_follow(OpCode::UnconditionalJumpToAbsoluteVariableAddress, var, follow)
    }

    pub fn unconditional_jump_to_relative_address(&mut self, addr: i32) -> ProgramResult<()> {
        self.append_opcode(OpCode::UnconditionalJumpToRelativeAddress)?;
        self.append4(addr)
    }

    pub fn unconditional_jump_to_relative_variable_address(&mut self, var: i32, follow: bool) -> ProgramResult<()> {
        self.var_follow(OpCode::UnconditionalJumpToRelativeVariableAddress, var, follow)
    }

    pub fn check_if_input_was_set(&mut self, var: i32, follow: bool, dst: i32, follow_dst: bool) -> ProgramResult<()> {
        self.append_opcode(OpCode::CheckIfInputWasSet)?;
        self.append4(var)?;
        self.append_flag(follow)?;
        self.append4(dst)?;
        self.append_flag(follow_dst)
    }

    pub fn load_string_table_item_length_limit_into_variable(&mut self, var: i32, follow: bool) -> ProgramResult<()> {
        self.var_follow(OpCode::LoadStringTableItemLengthLimitIntoVariable, var, follow)
    }

    fn stack_var(&mut self, opcode: OpCode, stack: i32, follow_stack: bool, var: i32, follow_var: bool) -> ProgramResult<()> {
        self.append_opcode(opcode)?;
        self.append4(stack)?;
        self.append_flag(follow_stack)?;
        self.append4(var)?;
        self.append_flag(follow_var)
    }

    pub fn push_variable_on_stack(
        &mut self,
        stack: i32,
        follow_stack: bool,
        var: i32,
        follow_var: bool,
    ) -> ProgramResult<()> {
        self.stack_var(OpCode::PushVariableOnStack, stack, follow_stack, var, follow_var)
    }

    pub fn push_constant_on_stack(&mut self, stack: i32, follow_stack: bool, c: i32) -> ProgramResult<()> {
        self.append_opcode(OpCode::PushConstantOnStack)?;
        self.append4(stack)?;
        self.append_flag(follow_stack)?;
        self.append4(c)
    }

    pub fn pop_variable_from_stack(
        &mut self,
        stack: i32,
        follow_stack: bool,
        var: i32,
        follow_var: bool,
    ) -> ProgramResult<()> {
        self.stack_var(OpCode::PopVariableFromStack, stack, follow_stack, var, follow_var)
    }

    pub fn pop_from_stack(&mut self, stack: i32, follow_stack: bool) -> ProgramResult<()> {
        self.var_follow(OpCode::PopFromStack, stack, follow_stack)
    }

    pub fn check_if_stack_is_empty(
        &mut self,
        stack: i32,
        follow_stack: bool,
        var: i32,
        follow_var: bool,
    ) -> ProgramResult<()> {
        self.stack_var(OpCode::CheckIfStackIsEmpty, stack, follow_stack, var, follow_var)
    }

    pub fn swap_variables(&mut self, a: i32, follow_a: bool, b: i32, follow_b: bool) -> ProgramResult<()> {
        self.a_b(OpCode::SwapVariables, a, follow_a, b, follow_b)
    }

    pub fn set_variable_string_table_entry(&mut self, var: i32, follow: bool, content: &[u8]) -> ProgramResult<()> {
        self.append_opcode(OpCode::SetVariableStringTableEntry)?;
        self.append4(var)?;
        self.append_flag(follow)?;
        self.append_string(content)
    }

    pub fn print_variable_string_from_string_table(&mut self, var: i32, follow: bool) -> ProgramResult<()> {
        self.var_follow(OpCode::PrintVariableStringFromStringTable, var, follow)
    }

    pub fn load_variable_string_item_length_into_variable(
        &mut self,
        string_var: i32,
        follow_string_var: bool,
        var: i32,
        follow_var: bool,
    ) -> ProgramResult<()> {
        self.src_dst(
            OpCode::LoadVariableStringItemLengthIntoVariable,
            string_var,
            follow_string_var,
            var,
            follow_var,
        )
    }

    pub fn load_variable_string_item_into_variables(
        &mut self,
        string_var: i32,
        follow_string_var: bool,
        start_var: i32,
        follow_start_var: bool,
    ) -> ProgramResult<()> {
        self.src_dst(
            OpCode::LoadVariableStringItemIntoVariables,
            string_var,
            follow_string_var,
            start_var,
            follow_start_var,
        )
    }

    pub fn terminate_with_variable_return_code(&mut self, var: i32, follow: bool) -> ProgramResult<()> {
        self.var_follow(OpCode::TerminateWithVariableReturnCode, var, follow)
    }

    fn variable_shift_or_rotate(
        &mut self,
        opcode: OpCode,
        var: i32,
        follow_var: bool,
        places_var: i32,
        follow_places: bool,
    ) -> ProgramResult<()> {
        self.append_opcode(opcode)?;
        self.append4(var)?;
        self.append_flag(follow_var)?;
        self.append4(places_var)?;
        self.append_flag(follow_places)
    }

    pub fn variable_bit_shift_variable_left(
        &mut self,
        var: i32,
        follow_var: bool,
        places_var: i32,
        follow_places: bool,
    ) -> ProgramResult<()> {
        self.variable_shift_or_rotate(OpCode::VariableBitShiftVariableLeft, var, follow_var, places_var, follow_places)
    }

    pub fn variable_bit_shift_variable_right(
        &mut self,
        var: i32,
        follow_var: bool,
        places_var: i32,
        follow_places: bool,
    ) -> ProgramResult<()> {
        self.variable_shift_or_rotate(OpCode::VariableBitShiftVariableRight, var, follow_var, places_var, follow_places)
    }

    pub fn variable_rotate_variable_left(
        &mut self,
        var: i32,
        follow_var: bool,
        places_var: i32,
        follow_places: bool,
    ) -> ProgramResult<()> {
        self.variable_shift_or_rotate(OpCode::VariableRotateVariableLeft, var, follow_var, places_var, follow_places)
    }

    pub fn variable_rotate_variable_right(
        &mut self,
        var: i32,
        follow_var: bool,
        places_var: i32,
        follow_places: bool,
    ) -> ProgramResult<()> {
        self.variable_shift_or_rotate(OpCode::VariableRotateVariableRight, var, follow_var, places_var, follow_places)
    }

    fn compare_against_constant(
        &mut self,
        opcode: OpCode,
        var: i32,
        follow_var: bool,
        c: i32,
        target: i32,
        follow_target: bool,
    ) -> ProgramResult<()> {
        self.append_opcode(opcode)?;
        self.append4(var)?;
        self.append_flag(follow_var)?;
        self.append4(c)?;
        self.append4(target)?;
        self.append_flag(follow_target)
    }

    pub fn compare_if_variable_gt_constant(
        &mut self,
        var: i32,
        follow_var: bool,
        c: i32,
        target: i32,
        follow_target: bool,
    ) -> ProgramResult<()> {
        self.compare_against_constant(OpCode::CompareIfVariableGtConstant, var, follow_var, c, target, follow_target)
    }

    pub fn compare_if_variable_lt_constant(
        &mut self,
        var: i32,
        follow_var: bool,
        c: i32,
        target: i32,
        follow_target: bool,
    ) -> ProgramResult<()> {
        self.compare_against_constant(OpCode::CompareIfVariableLtConstant, var, follow_var, c, target, follow_target)
    }

    pub fn compare_if_variable_eq_constant(
        &mut self,
        var: i32,
        follow_var: bool,
        c: i32,
        target: i32,
        follow_target: bool,
    ) -> ProgramResult<()> {
        self.compare_against_constant(OpCode::CompareIfVariableEqConstant, var, follow_var, c, target, follow_target)
    }

    fn compare_against_variable(
        &mut self,
        opcode: OpCode,
        a: i32,
        follow_a: bool,
        b: i32,
        follow_b: bool,
        target: i32,
        follow_target: bool,
    ) -> ProgramResult<()> {
        self.append_opcode(opcode)?;
        self.append4(a)?;
        self.append_flag(follow_a)?;
        self.append4(b)?;
        self.append_flag(follow_b)?;
        self.append4(target)?;
        self.append_flag(follow_target)
    }

    pub fn compare_if_variable_gt_variable(
        &mut self,
        a: i32,
        follow_a: bool,
        b: i32,
        follow_b: bool,
        target: i32,
        follow_target: bool,
    ) -> ProgramResult<()> {
        self.compare_against_variable(
            OpCode::CompareIfVariableGtVariable,
            a,
            follow_a,
            b,
            follow_b,
            target,
            follow_target,
        )
    }

    pub fn compare_if_variable_lt_variable(
        &mut self,
        a: i32,
        follow_a: bool,
        b: i32,
        follow_b: bool,
        target: i32,
        follow_target: bool,
    ) -> ProgramResult<()> {
        self.compare_against_variable(
            OpCode::CompareIfVariableLtVariable,
            a,
            follow_a,
            b,
            follow_b,
            target,
            follow_target,
        )
    }

    pub fn compare_if_variable_eq_variable(
        &mut self,
        a: i32,
        follow_a: bool,
        b: i32,
        follow_b: bool,
        target: i32,
        follow_target: bool,
    ) -> ProgramResult<()> {
        self.compare_against_variable(
            OpCode::CompareIfVariableEqVariable,
            a,
            follow_a,
            b,
            follow_b,
            target,
            follow_target,
        )
    }

    pub fn get_max_of_variable_and_constant(
        &mut self,
        var: i32,
        follow_var: bool,
        c: i32,
        target: i32,
        follow_target: bool,
    ) -> ProgramResult<()> {
        self.compare_against_constant(OpCode::GetMaxOfVariableAndConstant, var, follow_var, c, target, follow_target)
    }

    pub fn get_min_of_variable_and_constant(
        &mut self,
        var: i32,
        follow_var: bool,
        c: i32,
        target: i32,
        follow_target: bool,
    ) -> ProgramResult<()> {
        self.compare_against_constant(OpCode::GetMinOfVariableAndConstant, var, follow_var, c, target, follow_target)
    }

    pub fn get_max_of_variable_and_variable(
        &mut self,
        a: i32,
        follow_a: bool,
        b: i32,
        follow_b: bool,
        target: i32,
        follow_target: bool,
    ) -> ProgramResult<()> {
        self.compare_against_variable(
            OpCode::GetMaxOfVariableAndVariable,
            a,
            follow_a,
            b,
            follow_b,
            target,
            follow_target,
        )
    }

    pub fn get_min_of_variable_and_variable(
        &mut self,
        a: i32,
        follow_a: bool,
        b: i32,
        follow_b: bool,
        target: i32,
        follow_target: bool,
    ) -> ProgramResult<()> {
        self.compare_against_variable(
            OpCode::GetMinOfVariableAndVariable,
            a,
            follow_a,
            b,
            follow_b,
            target,
            follow_target,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_variable_emits_opcode_and_payload() {
        let mut program = Program::new_growing();
        program.declare_variable(3, VariableType::Int32).unwrap();
        assert_eq!(program.as_bytes(), [0x01, 3, 0, 0, 0, 0x00]);
    }

    #[test]
    fn set_variable_emits_follow_flag_and_value() {
        let mut program = Program::new_growing();
        program.set_variable(1, true, -5).unwrap();
        let mut expected = vec![0x02];
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.push(0x01);
        expected.extend_from_slice(&(-5i32).to_le_bytes());
        assert_eq!(program.as_bytes(), expected.as_slice());
    }

    #[test]
    fn terminate_encodes_signed_return_code() {
        let mut program = Program::new_growing();
        program.terminate(-1).unwrap();
        assert_eq!(program.as_bytes(), [0x1e, 0xff]);
    }

    #[test]
    fn get_max_of_variable_and_constant_matches_compare_shape() {
        let mut program = Program::new_growing();
        program.get_max_of_variable_and_constant(0, false, 10, 1, false).unwrap();
        assert_eq!(program.size(), 15);
        assert_eq!(program.read1(0).unwrap() as u8, OpCode::GetMaxOfVariableAndConstant as u8);
    }

    #[test]
    fn get_max_of_variable_and_variable_is_sixteen_bytes() {
        let mut program = Program::new_growing();
        program
            .get_max_of_variable_and_variable(0, false, 1, false, 2, false)
            .unwrap();
        assert_eq!(program.size(), 16);
    }

    #[test]
    fn set_string_table_entry_encodes_length_prefixed_bytes() {
        let mut program = Program::new_growing();
        program.set_string_table_entry(0, b"hi").unwrap();
        let mut expected = vec![0x1b];
        expected.extend_from_slice(&0i32.to_le_bytes());
        expected.extend_from_slice(&2i16.to_le_bytes());
        expected.extend_from_slice(b"hi");
        assert_eq!(program.as_bytes(), expected.as_slice());
    }
}
