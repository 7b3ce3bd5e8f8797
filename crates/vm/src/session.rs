//! Guest execution state bound to a [`Program`]: variables, string table, print buffer,
//! termination flag, and runtime statistics.

use hashbrown::{HashMap, HashSet};

use beast_config::SessionLimits;
use beast_program::{OpCode, Program, VariableType};
use rand::Rng;

use crate::error::{VmError, VmResult};

/// How a variable's value flows relative to the guest program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableIoBehavior {
    /// Plain guest-owned storage; the default on declaration.
    Store,
    /// Tracks a "changed since last guest read" flag set by outside writers.
    Input,
    /// Tracks a "written since last outside read" flag set by guest writes.
    Output,
}

#[derive(Debug, Clone)]
struct VariableDescriptor {
    var_type: VariableType,
    behavior: VariableIoBehavior,
    /// Input: set by outside write, cleared by guest read. Output: set by guest write,
    /// cleared by outside read.
    dirty: bool,
    value: i32,
}

/// Lifecycle state of a session under execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Terminated,
    AtEnd,
    Abnormal,
}

/// Per-opcode execution counters and the set of distinct executed addresses.
#[derive(Debug, Clone, Default)]
pub struct RuntimeStatistics {
    steps_executed: u32,
    operator_executions: HashMap<OpCode, u32>,
    executed_indices: HashSet<u32>,
    return_code: i8,
    abnormal_exit: bool,
}

impl RuntimeStatistics {
    pub fn steps_executed(&self) -> u32 {
        self.steps_executed
    }

    pub fn operator_executions(&self, opcode: OpCode) -> u32 {
        self.operator_executions.get(&opcode).copied().unwrap_or(0)
    }

    pub fn executed_indices(&self) -> &HashSet<u32> {
        &self.executed_indices
    }

    pub fn return_code(&self) -> i8 {
        self.return_code
    }

    pub fn abnormal_exit(&self) -> bool {
        self.abnormal_exit
    }
}

/// The mutable state bound to a [`Program`]: its variables, string table, print buffer,
/// cursor, and runtime statistics.
pub struct VmSession {
    program: Program,
    cursor: usize,
    variables: HashMap<i32, VariableDescriptor>,
    string_table: HashMap<i32, Vec<u8>>,
    print_buffer: Vec<u8>,
    limits: SessionLimits,
    state: SessionState,
    stats: RuntimeStatistics,
    rng: rand::rngs::ThreadRng,
}

impl VmSession {
    pub fn new(program: Program, limits: SessionLimits) -> Self {
        Self {
            program,
            cursor: 0,
            variables: HashMap::new(),
            string_table: HashMap::new(),
            print_buffer: Vec::new(),
            limits,
            state: SessionState::Running,
            stats: RuntimeStatistics::default(),
            rng: rand::thread_rng(),
        }
    }

    pub fn limits(&self) -> &SessionLimits {
        &self.limits
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    pub fn declared_variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn count_variables_with_behavior(&self, behavior: VariableIoBehavior) -> usize {
        self.variables.values().filter(|d| d.behavior == behavior).count()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn statistics(&self) -> &RuntimeStatistics {
        &self.stats
    }

    pub fn print_buffer(&self) -> &[u8] {
        &self.print_buffer
    }

    pub fn clear_print_buffer(&mut self) {
        self.print_buffer.clear();
    }

    /// Re-initializes all transient state: cursor, statistics, and variable values back to
    /// their declared types with `0`, ready to re-run the same program.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.state = SessionState::Running;
        self.stats = RuntimeStatistics::default();
        self.print_buffer.clear();
        for descriptor in self.variables.values_mut() {
            descriptor.value = 0;
            descriptor.dirty = false;
        }
    }

    // --- program cursor -------------------------------------------------

    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.program.size()
    }

    pub fn fetch1(&mut self) -> VmResult<i8> {
        let value = self.program.read1(self.cursor)?;
        self.cursor += 1;
        Ok(value)
    }

    pub fn fetch2(&mut self) -> VmResult<i16> {
        let value = self.program.read2(self.cursor)?;
        self.cursor += 2;
        Ok(value)
    }

    pub fn fetch4(&mut self) -> VmResult<i32> {
        let value = self.program.read4(self.cursor)?;
        self.cursor += 4;
        Ok(value)
    }

    // --- variables --------------------------------------------------------

    pub fn declare(&mut self, var: i32, var_type: VariableType) -> VmResult<()> {
        if var < 0 || var as u32 >= self.limits.variable_count {
            return Err(VmError::InvalidArgument {
                reason: format!("variable index {var} is out of range"),
            });
        }
        if self.variables.contains_key(&var) {
            return Err(VmError::InvalidArgument {
                reason: format!("variable {var} is already declared"),
            });
        }
        if self.variables.len() as u32 >= self.limits.variable_count {
            return Err(VmError::CapacityExceeded {
                reason: "variable table is full".to_string(),
            });
        }
        self.variables.insert(
            var,
            VariableDescriptor {
                var_type,
                behavior: VariableIoBehavior::Store,
                dirty: false,
                value: 0,
            },
        );
        Ok(())
    }

    pub fn undeclare(&mut self, var: i32) -> VmResult<()> {
        self.variables
            .remove(&var)
            .map(|_| ())
            .ok_or_else(|| VmError::InvalidArgument {
                reason: format!("variable {var} is not declared"),
            })
    }

    fn descriptor(&self, var: i32) -> VmResult<&VariableDescriptor> {
        self.variables.get(&var).ok_or_else(|| VmError::InvalidReference {
            reason: format!("variable {var} is not declared"),
        })
    }

    fn descriptor_mut(&mut self, var: i32) -> VmResult<&mut VariableDescriptor> {
        self.variables.get_mut(&var).ok_or_else(|| VmError::InvalidReference {
            reason: format!("variable {var} is not declared"),
        })
    }

    pub fn set_variable_behavior(&mut self, var: i32, behavior: VariableIoBehavior) -> VmResult<()> {
        self.descriptor_mut(var)?.behavior = behavior;
        Ok(())
    }

    pub fn get_variable_behavior(&self, var: i32, follow: bool) -> VmResult<VariableIoBehavior> {
        let real = self.resolve(var, follow)?;
        Ok(self.descriptor(real)?.behavior)
    }

    /// Chases a `Link` chain iteratively until a non-`Link` variable is reached, detecting
    /// cycles with a visited set bounded by `variable_count`.
    pub fn resolve(&self, var: i32, follow: bool) -> VmResult<i32> {
        if !follow {
            self.descriptor(var)?;
            return Ok(var);
        }
        let mut current = var;
        let mut visited = HashSet::new();
        loop {
            let descriptor = self.descriptor(current)?;
            if descriptor.var_type != VariableType::Link {
                return Ok(current);
            }
            if !visited.insert(current) || visited.len() as u32 > self.limits.variable_count {
                return Err(VmError::InvalidReference {
                    reason: format!("link cycle detected starting at variable {var}"),
                });
            }
            current = descriptor.value;
        }
    }

    pub fn read(&mut self, var: i32, follow: bool) -> VmResult<i32> {
        let real = self.resolve(var, follow)?;
        let descriptor = self.descriptor_mut(real)?;
        if descriptor.behavior == VariableIoBehavior::Input {
            descriptor.dirty = false;
        }
        Ok(descriptor.value)
    }

    pub fn write(&mut self, var: i32, follow: bool, value: i32) -> VmResult<()> {
        let real = self.resolve(var, follow)?;
        let descriptor = self.descriptor_mut(real)?;
        descriptor.value = value;
        if descriptor.behavior == VariableIoBehavior::Output {
            descriptor.dirty = true;
        }
        Ok(())
    }

    /// Outside-world write: sets an Input variable's dirty flag (the guest observes the
    /// change through [`check_if_input_was_set`](VmSession::check_if_input_was_set)).
    pub fn write_from_outside(&mut self, var: i32, value: i32) -> VmResult<()> {
        let descriptor = self.descriptor_mut(var)?;
        descriptor.value = value;
        if descriptor.behavior == VariableIoBehavior::Input {
            descriptor.dirty = true;
        }
        Ok(())
    }

    /// Outside-world read: clears an Output variable's dirty flag.
    pub fn read_from_outside(&mut self, var: i32) -> VmResult<i32> {
        let descriptor = self.descriptor_mut(var)?;
        let value = descriptor.value;
        if descriptor.behavior == VariableIoBehavior::Output {
            descriptor.dirty = false;
        }
        Ok(value)
    }

    pub fn has_output_data_available(&self, var: i32, follow: bool) -> VmResult<bool> {
        let real = self.resolve(var, follow)?;
        let descriptor = self.descriptor(real)?;
        if descriptor.behavior != VariableIoBehavior::Output {
            return Err(VmError::InvalidArgument {
                reason: format!("variable {real} is not Output-behavior"),
            });
        }
        Ok(descriptor.dirty)
    }

    /// `CheckIfInputWasSet`: on a Store-behavior variable this returns `false` rather than
    /// erroring, matching the source's permissive behavior for this one query.
    pub fn check_if_input_was_set(&self, var: i32, follow: bool) -> VmResult<bool> {
        let real = self.resolve(var, follow)?;
        let descriptor = self.descriptor(real)?;
        Ok(descriptor.behavior == VariableIoBehavior::Input && descriptor.dirty)
    }

    // --- string table -------------------------------------------------------

    fn check_string_table_index(&self, idx: i32) -> VmResult<()> {
        if idx < 0 || idx as u32 >= self.limits.string_table_count {
            return Err(VmError::InvalidArgument {
                reason: format!("string table index {idx} is out of range"),
            });
        }
        Ok(())
    }

    pub fn set_string_table_entry(&mut self, idx: i32, content: Vec<u8>) -> VmResult<()> {
        self.check_string_table_index(idx)?;
        if content.len() as u32 > self.limits.max_string_size {
            return Err(VmError::CapacityExceeded {
                reason: format!(
                    "string of {} bytes exceeds the {} byte limit",
                    content.len(),
                    self.limits.max_string_size
                ),
            });
        }
        self.string_table.insert(idx, content);
        Ok(())
    }

    pub fn string_table_entry(&self, idx: i32) -> VmResult<&[u8]> {
        self.check_string_table_index(idx)?;
        Ok(self.string_table.get(&idx).map(Vec::as_slice).unwrap_or(&[]))
    }

    // --- print buffer ---------------------------------------------------------

    fn append_to_print_buffer(&mut self, bytes: &[u8]) -> VmResult<()> {
        if let Some(limit) = self.limits.max_print_buffer_size {
            if self.print_buffer.len() + bytes.len() > limit as usize {
                return Err(VmError::CapacityExceeded {
                    reason: format!("print buffer would exceed its {limit} byte limit"),
                });
            }
        }
        self.print_buffer.extend_from_slice(bytes);
        Ok(())
    }

    pub fn print_string(&mut self, content: &[u8]) -> VmResult<()> {
        self.append_to_print_buffer(content)
    }

    pub fn print_variable(&mut self, var: i32, follow: bool, as_char: bool) -> VmResult<()> {
        let value = self.read(var, follow)?;
        if as_char {
            self.append_to_print_buffer(&[value as u8])
        } else {
            self.append_to_print_buffer(value.to_string().as_bytes())
        }
    }

    // --- termination --------------------------------------------------------

    pub fn terminate(&mut self, code: i8) {
        self.state = SessionState::Terminated;
        self.stats.return_code = code;
    }

    pub fn was_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    pub fn mark_abnormal_exit(&mut self) {
        self.state = SessionState::Abnormal;
        self.stats.abnormal_exit = true;
    }

    // --- statistics -----------------------------------------------------------

    pub fn inform_about_step(&mut self, opcode: OpCode) {
        self.stats.steps_executed += 1;
        *self.stats.operator_executions.entry(opcode).or_insert(0) += 1;
        self.stats.executed_indices.insert(opcode as u32);
    }

    // --- arithmetic and bit operators ----------------------------------------

    pub fn add_constant_to_variable(&mut self, var: i32, follow: bool, c: i32) -> VmResult<()> {
        let value = self.read(var, follow)?.wrapping_add(c);
        self.write(var, follow, value)
    }

    pub fn add_variable_to_variable(&mut self, src: i32, fs: bool, dst: i32, fd: bool) -> VmResult<()> {
        let a = self.read(src, fs)?;
        let b = self.read(dst, fd)?;
        self.write(dst, fd, b.wrapping_add(a))
    }

    pub fn subtract_constant_from_variable(&mut self, var: i32, follow: bool, c: i32) -> VmResult<()> {
        let value = self.read(var, follow)?.wrapping_sub(c);
        self.write(var, follow, value)
    }

    pub fn subtract_variable_from_variable(&mut self, src: i32, fs: bool, dst: i32, fd: bool) -> VmResult<()> {
        let a = self.read(src, fs)?;
        let b = self.read(dst, fd)?;
        self.write(dst, fd, b.wrapping_sub(a))
    }

    pub fn copy_variable(&mut self, src: i32, fs: bool, dst: i32, fd: bool) -> VmResult<()> {
        let value = self.read(src, fs)?;
        self.write(dst, fd, value)
    }

    pub fn swap_variables(&mut self, a: i32, fa: bool, b: i32, fb: bool) -> VmResult<()> {
        let va = self.read(a, fa)?;
        let vb = self.read(b, fb)?;
        self.write(a, fa, vb)?;
        self.write(b, fb, va)
    }

    pub fn bit_wise_invert_variable(&mut self, var: i32, follow: bool) -> VmResult<()> {
        let value = !self.read(var, follow)?;
        self.write(var, follow, value)
    }

    pub fn bit_wise_and_two_variables(&mut self, a: i32, fa: bool, b: i32, fb: bool) -> VmResult<()> {
        let va = self.read(a, fa)?;
        let vb = self.read(b, fb)?;
        self.write(b, fb, va & vb)
    }

    pub fn bit_wise_or_two_variables(&mut self, a: i32, fa: bool, b: i32, fb: bool) -> VmResult<()> {
        let va = self.read(a, fa)?;
        let vb = self.read(b, fb)?;
        self.write(b, fb, va | vb)
    }

    pub fn bit_wise_xor_two_variables(&mut self, a: i32, fa: bool, b: i32, fb: bool) -> VmResult<()> {
        let va = self.read(a, fa)?;
        let vb = self.read(b, fb)?;
        self.write(b, fb, va ^ vb)
    }

    /// Normalizes a signed shift/rotate amount: negative values shift/rotate the opposite
    /// direction with the same magnitude; `|places| >= 32` reduces to a no-op-sized shift.
    fn normalize_shift(places: i32, left: bool) -> (u32, bool) {
        let (magnitude, left) = if places < 0 {
            (places.unsigned_abs(), !left)
        } else {
            (places as u32, left)
        };
        (magnitude.min(32), left)
    }

    fn shift(value: i32, places: i32, left: bool) -> i32 {
        let (magnitude, left) = Self::normalize_shift(places, left);
        if magnitude >= 32 {
            0
        } else if left {
            ((value as u32) << magnitude) as i32
        } else {
            ((value as u32) >> magnitude) as i32
        }
    }

    fn rotate(value: i32, places: i32, left: bool) -> i32 {
        let (magnitude, left) = Self::normalize_shift(places, left);
        let magnitude = magnitude % 32;
        if left {
            (value as u32).rotate_left(magnitude) as i32
        } else {
            (value as u32).rotate_right(magnitude) as i32
        }
    }

    pub fn bit_shift_variable_left(&mut self, var: i32, follow: bool, places: i8) -> VmResult<()> {
        let value = self.read(var, follow)?;
        self.write(var, follow, Self::shift(value, places as i32, true))
    }

    pub fn bit_shift_variable_right(&mut self, var: i32, follow: bool, places: i8) -> VmResult<()> {
        let value = self.read(var, follow)?;
        self.write(var, follow, Self::shift(value, places as i32, false))
    }

    pub fn variable_bit_shift_variable_left(
        &mut self,
        var: i32,
        follow_var: bool,
        places_var: i32,
        follow_places: bool,
    ) -> VmResult<()> {
        let value = self.read(var, follow_var)?;
        let places = self.read(places_var, follow_places)?;
        self.write(var, follow_var, Self::shift(value, places, true))
    }

    pub fn variable_bit_shift_variable_right(
        &mut self,
        var: i32,
        follow_var: bool,
        places_var: i32,
        follow_places: bool,
    ) -> VmResult<()> {
        let value = self.read(var, follow_var)?;
        let places = self.read(places_var, follow_places)?;
        self.write(var, follow_var, Self::shift(value, places, false))
    }

    pub fn rotate_variable_left(&mut self, var: i32, follow: bool, places: i8) -> VmResult<()> {
        let value = self.read(var, follow)?;
        self.write(var, follow, Self::rotate(value, places as i32, true))
    }

    pub fn rotate_variable_right(&mut self, var: i32, follow: bool, places: i8) -> VmResult<()> {
        let value = self.read(var, follow)?;
        self.write(var, follow, Self::rotate(value, places as i32, false))
    }

    pub fn variable_rotate_variable_left(
        &mut self,
        var: i32,
        follow_var: bool,
        places_var: i32,
        follow_places: bool,
    ) -> VmResult<()> {
        let value = self.read(var, follow_var)?;
        let places = self.read(places_var, follow_places)?;
        self.write(var, follow_var, Self::rotate(value, places, true))
    }

    pub fn variable_rotate_variable_right(
        &mut self,
        var: i32,
        follow_var: bool,
        places_var: i32,
        follow_places: bool,
    ) -> VmResult<()> {
        let value = self.read(var, follow_var)?;
        let places = self.read(places_var, follow_places)?;
        self.write(var, follow_var, Self::rotate(value, places, false))
    }

    pub fn modulo_variable_by_constant(&mut self, var: i32, follow: bool, c: i32) -> VmResult<()> {
        if c == 0 {
            return Err(VmError::DivideByZero);
        }
        let value = self.read(var, follow)?;
        self.write(var, follow, value.wrapping_rem(c))
    }

    pub fn modulo_variable_by_variable(
        &mut self,
        var: i32,
        follow: bool,
        modulus: i32,
        follow_modulus: bool,
    ) -> VmResult<()> {
        let m = self.read(modulus, follow_modulus)?;
        if m == 0 {
            return Err(VmError::DivideByZero);
        }
        let value = self.read(var, follow)?;
        self.write(var, follow, value.wrapping_rem(m))
    }

    pub fn load_random_value_into_variable(&mut self, var: i32, follow: bool) -> VmResult<()> {
        let value: i32 = self.rng.gen();
        self.write(var, follow, value)
    }

    fn compare(value: i32, other: i32, op: CompareOp) -> i32 {
        let result = match op {
            CompareOp::Gt => value > other,
            CompareOp::Lt => value < other,
            CompareOp::Eq => value == other,
        };
        i32::from(result)
    }

    pub fn compare_if_variable_gt_constant(
        &mut self,
        var: i32,
        follow: bool,
        c: i32,
        target: i32,
        follow_target: bool,
    ) -> VmResult<()> {
        let value = self.read(var, follow)?;
        self.write(target, follow_target, Self::compare(value, c, CompareOp::Gt))
    }

    pub fn compare_if_variable_lt_constant(
        &mut self,
        var: i32,
        follow: bool,
        c: i32,
        target: i32,
        follow_target: bool,
    ) -> VmResult<()> {
        let value = self.read(var, follow)?;
        self.write(target, follow_target, Self::compare(value, c, CompareOp::Lt))
    }

    pub fn compare_if_variable_eq_constant(
        &mut self,
        var: i32,
        follow: bool,
        c: i32,
        target: i32,
        follow_target: bool,
    ) -> VmResult<()> {
        let value = self.read(var, follow)?;
        self.write(target, follow_target, Self::compare(value, c, CompareOp::Eq))
    }

    fn compare_against_variable(
        &mut self,
        a: i32,
        fa: bool,
        b: i32,
        fb: bool,
        target: i32,
        follow_target: bool,
        op: CompareOp,
    ) -> VmResult<()> {
        let va = self.read(a, fa)?;
        let vb = self.read(b, fb)?;
        self.write(target, follow_target, Self::compare(va, vb, op))
    }

    pub fn compare_if_variable_gt_variable(
        &mut self,
        a: i32,
        fa: bool,
        b: i32,
        fb: bool,
        target: i32,
        follow_target: bool,
    ) -> VmResult<()> {
        self.compare_against_variable(a, fa, b, fb, target, follow_target, CompareOp::Gt)
    }

    pub fn compare_if_variable_lt_variable(
        &mut self,
        a: i32,
        fa: bool,
        b: i32,
        fb: bool,
        target: i32,
        follow_target: bool,
    ) -> VmResult<()> {
        self.compare_against_variable(a, fa, b, fb, target, follow_target, CompareOp::Lt)
    }

    pub fn compare_if_variable_eq_variable(
        &mut self,
        a: i32,
        fa: bool,
        b: i32,
        fb: bool,
        target: i32,
        follow_target: bool,
    ) -> VmResult<()> {
        self.compare_against_variable(a, fa, b, fb, target, follow_target, CompareOp::Eq)
    }

    pub fn get_max_of_variable_and_constant(
        &mut self,
        var: i32,
        follow: bool,
        c: i32,
        target: i32,
        follow_target: bool,
    ) -> VmResult<()> {
        let value = self.read(var, follow)?;
        self.write(target, follow_target, value.max(c))
    }

    pub fn get_min_of_variable_and_constant(
        &mut self,
        var: i32,
        follow: bool,
        c: i32,
        target: i32,
        follow_target: bool,
    ) -> VmResult<()> {
        let value = self.read(var, follow)?;
        self.write(target, follow_target, value.min(c))
    }

    pub fn get_max_of_variable_and_variable(
        &mut self,
        a: i32,
        fa: bool,
        b: i32,
        fb: bool,
        target: i32,
        follow_target: bool,
    ) -> VmResult<()> {
        let va = self.read(a, fa)?;
        let vb = self.read(b, fb)?;
        self.write(target, follow_target, va.max(vb))
    }

    pub fn get_min_of_variable_and_variable(
        &mut self,
        a: i32,
        fa: bool,
        b: i32,
        fb: bool,
        target: i32,
        follow_target: bool,
    ) -> VmResult<()> {
        let va = self.read(a, fa)?;
        let vb = self.read(b, fb)?;
        self.write(target, follow_target, va.min(vb))
    }

    // --- stack-in-variable-array convention ------------------------------------

    pub fn push_variable_on_stack(&mut self, stack: i32, fs: bool, var: i32, fv: bool) -> VmResult<()> {
        let value = self.read(var, fv)?;
        self.push_on_stack(stack, fs, value)
    }

    pub fn push_constant_on_stack(&mut self, stack: i32, fs: bool, c: i32) -> VmResult<()> {
        self.push_on_stack(stack, fs, c)
    }

    fn push_on_stack(&mut self, stack: i32, fs: bool, value: i32) -> VmResult<()> {
        let real_stack = self.resolve(stack, fs)?;
        let depth = self.read(real_stack, false)?;
        if real_stack + depth + 1 >= self.limits.variable_count as i32 {
            return Err(VmError::CapacityExceeded {
                reason: format!("stack at variable {real_stack} is full"),
            });
        }
        self.write(real_stack + depth + 1, false, value)?;
        self.write(real_stack, false, depth + 1)
    }

    pub fn pop_variable_from_stack(&mut self, stack: i32, fs: bool, var: i32, fv: bool) -> VmResult<()> {
        let value = self.pop_from_stack_value(stack, fs)?;
        self.write(var, fv, value)
    }

    pub fn pop_from_stack(&mut self, stack: i32, fs: bool) -> VmResult<()> {
        self.pop_from_stack_value(stack, fs).map(|_| ())
    }

    fn pop_from_stack_value(&mut self, stack: i32, fs: bool) -> VmResult<i32> {
        let real_stack = self.resolve(stack, fs)?;
        let depth = self.read(real_stack, false)?;
        if depth == 0 {
            return Err(VmError::StackUnderflow);
        }
        let value = self.read(real_stack + depth, false)?;
        self.write(real_stack, false, depth - 1)?;
        Ok(value)
    }

    pub fn check_if_stack_is_empty(&mut self, stack: i32, fs: bool, var: i32, fv: bool) -> VmResult<()> {
        let real_stack = self.resolve(stack, fs)?;
        let depth = self.read(real_stack, false)?;
        self.write(var, fv, i32::from(depth == 0))
    }
}

#[derive(Debug, Clone, Copy)]
enum CompareOp {
    Gt,
    Lt,
    Eq,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> VmSession {
        VmSession::new(Program::new_growing(), SessionLimits::default())
    }

    #[test]
    fn int32_round_trips() {
        let mut s = session();
        s.declare(0, VariableType::Int32).unwrap();
        s.write(0, true, -44).unwrap();
        assert_eq!(s.read(0, true).unwrap(), -44);
    }

    #[test]
    fn link_resolves_to_target() {
        let mut s = session();
        s.declare(0, VariableType::Int32).unwrap();
        s.declare(1, VariableType::Link).unwrap();
        s.write(1, false, 0).unwrap();
        s.write(1, true, 7).unwrap();
        assert_eq!(s.read(0, true).unwrap(), 7);
        assert_eq!(s.read(1, true).unwrap(), 7);
    }

    #[test]
    fn self_link_cycle_is_invalid_reference() {
        let mut s = session();
        s.declare(0, VariableType::Link).unwrap();
        s.write(0, false, 0).unwrap();
        assert!(matches!(s.read(0, true), Err(VmError::InvalidReference { .. })));
    }

    #[test]
    fn output_dirty_flag_tracks_guest_write_and_outside_read() {
        let mut s = session();
        s.declare(0, VariableType::Int32).unwrap();
        s.set_variable_behavior(0, VariableIoBehavior::Output).unwrap();
        assert!(!s.has_output_data_available(0, false).unwrap());
        s.write(0, false, 5).unwrap();
        assert!(s.has_output_data_available(0, false).unwrap());
        s.read_from_outside(0).unwrap();
        assert!(!s.has_output_data_available(0, false).unwrap());
    }

    #[test]
    fn input_dirty_flag_tracks_outside_write_and_guest_read() {
        let mut s = session();
        s.declare(0, VariableType::Int32).unwrap();
        s.set_variable_behavior(0, VariableIoBehavior::Input).unwrap();
        assert!(!s.check_if_input_was_set(0, false).unwrap());
        s.write_from_outside(0, 9).unwrap();
        assert!(s.check_if_input_was_set(0, false).unwrap());
        s.read(0, false).unwrap();
        assert!(!s.check_if_input_was_set(0, false).unwrap());
    }

    #[test]
    fn check_if_input_was_set_on_store_variable_is_false() {
        let mut s = session();
        s.declare(0, VariableType::Int32).unwrap();
        assert!(!s.check_if_input_was_set(0, false).unwrap());
    }

    #[test]
    fn negative_shift_reverses_direction() {
        assert_eq!(VmSession::shift(1, 1, true), 2);
        assert_eq!(VmSession::shift(1, -1, true), VmSession::shift(1, 1, false));
    }

    #[test]
    fn shift_of_32_or_more_is_zero() {
        assert_eq!(VmSession::shift(0xff, 32, true), 0);
        assert_eq!(VmSession::shift(0xff, 100, true), 0);
    }

    #[test]
    fn stack_push_pop_round_trips_in_reverse_order() {
        let mut s = session();
        for i in 0..12 {
            s.declare(i, VariableType::Int32).unwrap();
        }
        s.push_constant_on_stack(0, false, 1).unwrap();
        s.push_constant_on_stack(0, false, 2).unwrap();
        s.push_constant_on_stack(0, false, 3).unwrap();
        s.pop_variable_from_stack(0, false, 10, false).unwrap();
        s.pop_variable_from_stack(0, false, 11, false).unwrap();
        assert_eq!(s.read(10, false).unwrap(), 3);
        assert_eq!(s.read(11, false).unwrap(), 2);
        s.check_if_stack_is_empty(0, false, 9, false).unwrap();
        assert_eq!(s.read(9, false).unwrap(), 0);
    }

    #[test]
    fn popping_empty_stack_is_underflow() {
        let mut s = session();
        s.declare(0, VariableType::Int32).unwrap();
        assert!(matches!(s.pop_from_stack(0, false), Err(VmError::StackUnderflow)));
    }

    #[test]
    fn divide_by_zero_on_modulo() {
        let mut s = session();
        s.declare(0, VariableType::Int32).unwrap();
        assert!(matches!(
            s.modulo_variable_by_constant(0, false, 0),
            Err(VmError::DivideByZero)
        ));
    }
}
