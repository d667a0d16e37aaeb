//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;
use vmctl_common::{PowerState, VmView};

use crate::output::OutputContext;

const NO_ADDRESS: &str = "-";

/// Renders VM views as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render one VM after an operation, headed by `headline`.
    pub fn render_vm(&self, headline: &str, vm: &VmView) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.success(headline);
        self.ctx.kv("State:  ", &self.state_label(vm.state));
        self.ctx.kv("OS:     ", &vm.os);
        self.ctx.kv(
            "Size:   ",
            &format!("{} vCPU, {} GB RAM, {} GB disk", vm.num_cpu, vm.ram_gb, vm.storage),
        );
        self.ctx
            .kv("Address:", vm.ip.as_deref().unwrap_or(NO_ADDRESS));
    }

    /// Render an owner's VMs as a table.
    pub fn render_vm_list(&self, vms: &[VmView]) {
        if self.ctx.quiet {
            return;
        }
        if vms.is_empty() {
            self.ctx.info("No VMs. Create one with: vmctl create <name> --os ubuntu");
            return;
        }
        let width = name_width(vms);
        println!(
            "  {}",
            format_row(width, "NAME", "OS", "CPU", "RAM", "DISK", &pad("STATE", "STATE"), "ADDRESS")
                .style(self.ctx.styles.header)
        );
        for vm in vms {
            let state = pad(vm.state.as_str(), &self.state_label(vm.state));
            let row = format_row(
                width,
                &vm.name,
                &vm.os,
                &vm.num_cpu.to_string(),
                &format!("{}G", vm.ram_gb),
                &format!("{}G", vm.storage),
                &state,
                vm.ip.as_deref().unwrap_or(NO_ADDRESS),
            );
            println!("  {row}");
        }
    }

    /// Render the effective configuration as YAML.
    pub fn render_config(&self, path: &str, yaml: &str) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.header(&format!("Configuration ({path})"));
        for line in yaml.lines() {
            println!("    {line}");
        }
    }

    fn state_label(&self, state: PowerState) -> String {
        let style = match state {
            PowerState::PoweredOn => self.ctx.styles.running,
            PowerState::PoweredOff => self.ctx.styles.dim,
            PowerState::Suspended => self.ctx.styles.paused,
        };
        state.as_str().style(style).to_string()
    }
}

fn name_width(vms: &[VmView]) -> usize {
    vms.iter()
        .map(|vm| vm.name.len())
        .chain(std::iter::once("NAME".len()))
        .max()
        .unwrap_or_default()
}

const STATE_WIDTH: usize = 12;

/// Left-align `styled` in the state column, measuring the unstyled text.
fn pad(plain: &str, styled: &str) -> String {
    let fill = STATE_WIDTH.saturating_sub(plain.len());
    format!("{styled}{}", " ".repeat(fill))
}

#[allow(clippy::too_many_arguments)]
fn format_row(
    name_width: usize,
    name: &str,
    os: &str,
    cpu: &str,
    ram: &str,
    disk: &str,
    state_cell: &str,
    address: &str,
) -> String {
    format!("{name:<name_width$}  {os:<8}{cpu:>4}{ram:>6}{disk:>7}  {state_cell}{address}")
        .trim_end()
        .to_string()
}
