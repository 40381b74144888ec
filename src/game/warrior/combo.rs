// Combo resolution for discrete combat inputs

use log::debug;

use super::ControllerError;

/// Discrete combat input fed to the combo resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComboInput {
    LightAttack,
    HeavyAttack,
    Dash,
}

/// One step of a combo chain
#[derive(Debug, Clone, PartialEq)]
pub struct ComboStep {
    pub input: ComboInput,
    /// Animation node to jump to; `None` for steps that only open the chain
    pub node: Option<String>,
    /// State machine holding `node`; `None` means the locomotion graph
    pub state_machine: Option<String>,
    /// Seconds the next step of the chain can be entered after this one
    pub window: f32,
}

impl ComboStep {
    pub fn new(input: ComboInput, node: &str, window: f32) -> Self {
        Self {
            input,
            node: Some(node.to_string()),
            state_machine: None,
            window,
        }
    }

    /// A step that plays nothing itself but can start a chain
    pub fn opener(input: ComboInput, window: f32) -> Self {
        Self {
            input,
            node: None,
            state_machine: None,
            window,
        }
    }

    pub fn in_state_machine(mut self, state_machine: &str) -> Self {
        self.state_machine = Some(state_machine.to_string());
        self
    }
}

/// A named sequence of combo steps
#[derive(Debug, Clone, PartialEq)]
pub struct ComboChain {
    pub name: String,
    pub steps: Vec<ComboStep>,
}

impl ComboChain {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: ComboStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Whether this chain starts with exactly `sequence`
    fn matches_prefix(&self, sequence: &[ComboInput]) -> bool {
        self.steps.len() >= sequence.len()
            && self
                .steps
                .iter()
                .zip(sequence)
                .all(|(step, input)| step.input == *input)
    }
}

/// Data-driven combo table; earlier chains win ties
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComboTable {
    chains: Vec<ComboChain>,
}

impl ComboTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self, chain: ComboChain) -> Self {
        self.chains.push(chain);
        self
    }

    pub fn chains(&self) -> &[ComboChain] {
        &self.chains
    }

    /// The standard warrior move list
    pub fn standard() -> Self {
        use ComboInput::*;

        Self::new()
            .with_chain(
                ComboChain::new("light_string")
                    .step(ComboStep::new(LightAttack, "LightAttack1", 0.6))
                    .step(ComboStep::new(LightAttack, "LightAttack2", 0.6))
                    .step(ComboStep::new(LightAttack, "LightAttack3", 0.6)),
            )
            .with_chain(
                ComboChain::new("light_heavy_finisher")
                    .step(ComboStep::new(LightAttack, "LightAttack1", 0.6))
                    .step(ComboStep::new(LightAttack, "LightAttack2", 0.6))
                    .step(ComboStep::new(HeavyAttack, "HeavyFinisher", 0.8)),
            )
            .with_chain(
                ComboChain::new("heavy_string")
                    .step(ComboStep::new(HeavyAttack, "HeavyAttack1", 0.8))
                    .step(ComboStep::new(HeavyAttack, "HeavyAttack2", 0.8)),
            )
            .with_chain(
                ComboChain::new("dash_strike")
                    .step(ComboStep::opener(Dash, 0.4))
                    .step(ComboStep::new(LightAttack, "DashAttack", 0.6)),
            )
    }

    /// Reject empty chains, non-positive windows and blank node names
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.chains.is_empty() {
            return Err(ControllerError::EmptyComboTable);
        }

        for chain in &self.chains {
            if chain.steps.is_empty() {
                return Err(ControllerError::EmptyComboChain(chain.name.clone()));
            }

            for (index, step) in chain.steps.iter().enumerate() {
                if !step.window.is_finite() || step.window <= 0.0 {
                    return Err(ControllerError::InvalidComboWindow {
                        chain: chain.name.clone(),
                        step: index,
                        window: step.window,
                    });
                }
                if step.node.as_deref().is_some_and(str::is_empty) {
                    return Err(ControllerError::EmptyNodeName {
                        chain: chain.name.clone(),
                        step: index,
                    });
                }
            }
        }

        Ok(())
    }

    /// First chain beginning with `sequence`, and the step the sequence ends on
    fn resolve(&self, sequence: &[ComboInput]) -> Option<(&ComboChain, &ComboStep)> {
        let chain = self.chains.iter().find(|c| c.matches_prefix(sequence))?;
        let step = chain.steps.get(sequence.len().checked_sub(1)?)?;
        Some((chain, step))
    }
}

/// Tracks the combo sequence in progress and its timing window
#[derive(Debug, Clone)]
pub struct ComboResolver {
    table: ComboTable,
    sequence: Vec<ComboInput>,
    window_remaining: f32,
}

impl ComboResolver {
    pub fn new(table: ComboTable) -> Self {
        Self {
            table,
            sequence: Vec::new(),
            window_remaining: 0.0,
        }
    }

    /// Feed an input. Returns the step it resolved to, either extending the
    /// current chain or starting a new one; `None` when no chain begins with
    /// this input.
    pub fn combo_check(&mut self, input: ComboInput) -> Option<ComboStep> {
        if self.is_window_open() {
            let mut extended = self.sequence.clone();
            extended.push(input);

            if let Some((chain, step)) = self.table.resolve(&extended) {
                debug!(
                    "Combo '{}' advanced to step {} ({:?})",
                    chain.name,
                    extended.len(),
                    input
                );
                let step = step.clone();
                self.sequence = extended;
                self.window_remaining = step.window;
                return Some(step);
            }
        }

        // Chain broken or window closed: restart from this input
        self.sequence.clear();
        self.sequence.push(input);

        match self.table.resolve(&self.sequence) {
            Some((chain, step)) => {
                debug!("Combo '{}' started ({:?})", chain.name, input);
                let step = step.clone();
                self.window_remaining = step.window;
                Some(step)
            }
            None => {
                debug!("No combo starts with {:?}", input);
                self.reset();
                None
            }
        }
    }

    /// Close the window as time passes (called every frame)
    pub fn tick(&mut self, dt: f32) {
        if self.window_remaining > 0.0 {
            self.window_remaining = (self.window_remaining - dt).max(0.0);
        }
    }

    /// Drop any chain in progress
    pub fn reset(&mut self) {
        self.sequence.clear();
        self.window_remaining = 0.0;
    }

    pub fn is_window_open(&self) -> bool {
        self.window_remaining > 0.0 && !self.sequence.is_empty()
    }

    /// Inputs of the chain in progress, oldest first
    pub fn sequence(&self) -> &[ComboInput] {
        &self.sequence
    }

    pub fn table(&self) -> &ComboTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ComboInput::*;

    fn node(step: Option<ComboStep>) -> Option<String> {
        step.and_then(|s| s.node)
    }

    #[test]
    fn test_standard_table_is_valid() {
        assert!(ComboTable::standard().validate().is_ok());
    }

    #[test]
    fn test_light_string_advances() {
        let mut combo = ComboResolver::new(ComboTable::standard());

        assert_eq!(node(combo.combo_check(LightAttack)).as_deref(), Some("LightAttack1"));
        combo.tick(0.3);
        assert_eq!(node(combo.combo_check(LightAttack)).as_deref(), Some("LightAttack2"));
        combo.tick(0.3);
        assert_eq!(node(combo.combo_check(LightAttack)).as_deref(), Some("LightAttack3"));
        assert_eq!(combo.sequence(), &[LightAttack, LightAttack, LightAttack]);
    }

    #[test]
    fn test_branching_finisher() {
        let mut combo = ComboResolver::new(ComboTable::standard());

        combo.combo_check(LightAttack);
        combo.combo_check(LightAttack);
        assert_eq!(node(combo.combo_check(HeavyAttack)).as_deref(), Some("HeavyFinisher"));
    }

    #[test]
    fn test_closed_window_restarts_chain() {
        let mut combo = ComboResolver::new(ComboTable::standard());

        combo.combo_check(LightAttack);
        combo.tick(1.0);
        assert!(!combo.is_window_open());

        assert_eq!(node(combo.combo_check(LightAttack)).as_deref(), Some("LightAttack1"));
        assert_eq!(combo.sequence(), &[LightAttack]);
    }

    #[test]
    fn test_broken_chain_restarts_with_new_input() {
        let mut combo = ComboResolver::new(ComboTable::standard());

        combo.combo_check(HeavyAttack);
        // Heavy then light extends nothing; light starts its own chain
        assert_eq!(node(combo.combo_check(LightAttack)).as_deref(), Some("LightAttack1"));
        assert_eq!(combo.sequence(), &[LightAttack]);
    }

    #[test]
    fn test_completed_chain_restarts() {
        let mut combo = ComboResolver::new(ComboTable::standard());

        combo.combo_check(HeavyAttack);
        combo.combo_check(HeavyAttack);
        assert_eq!(node(combo.combo_check(HeavyAttack)).as_deref(), Some("HeavyAttack1"));
    }

    #[test]
    fn test_dash_opens_dash_strike() {
        let mut combo = ComboResolver::new(ComboTable::standard());

        let opener = combo.combo_check(Dash).expect("dash opens a chain");
        assert_eq!(opener.node, None);
        assert_eq!(node(combo.combo_check(LightAttack)).as_deref(), Some("DashAttack"));
    }

    #[test]
    fn test_unknown_opener_resets() {
        let table = ComboTable::new().with_chain(
            ComboChain::new("light_only").step(ComboStep::new(LightAttack, "Jab", 0.5)),
        );
        let mut combo = ComboResolver::new(table);

        combo.combo_check(LightAttack);
        assert_eq!(combo.combo_check(Dash), None);
        assert!(combo.sequence().is_empty());
        assert!(!combo.is_window_open());
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        assert_eq!(ComboTable::new().validate(), Err(ControllerError::EmptyComboTable));

        let empty_chain = ComboTable::new().with_chain(ComboChain::new("nothing"));
        assert_eq!(
            empty_chain.validate(),
            Err(ControllerError::EmptyComboChain("nothing".to_string()))
        );

        let zero_window = ComboTable::new()
            .with_chain(ComboChain::new("instant").step(ComboStep::new(LightAttack, "Jab", 0.0)));
        assert!(matches!(
            zero_window.validate(),
            Err(ControllerError::InvalidComboWindow { step: 0, .. })
        ));

        let blank_node = ComboTable::new()
            .with_chain(ComboChain::new("blank").step(ComboStep::new(LightAttack, "", 0.5)));
        assert!(matches!(
            blank_node.validate(),
            Err(ControllerError::EmptyNodeName { step: 0, .. })
        ));
    }
}
