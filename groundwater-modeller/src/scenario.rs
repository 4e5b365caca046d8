//! Builds a complete simulation from a [`Config`].

use crate::config::Config;
use crate::grid::CellId;
use crate::model::{GwfModel, NewtonOptions};
use crate::packages::{Chd, Dis, GridArray, Ic, Ims, Npf, Oc, OutputKind, Tdis, Wel};
use crate::simulation::Simulation;
use crate::stress::{constant_head_ring, point_source_in, HeadRecord, WellRecord};
use anyhow::Result;
use tracing::debug;

/// Assembles the simulation, its single flow model and every package the
/// configuration asks for.
pub fn build_simulation(config: &Config) -> Result<Simulation> {
    let name = &config.simulation.name;
    let mut sim = Simulation::new(
        name,
        config.simulation.workspace(),
        &config.simulation.exe_name,
    );
    sim.settings = config.settings.clone();
    sim.tdis = Tdis::new(config.time.time_units, config.time.periods.clone());
    sim.ims = Ims {
        complexity: config.solver.complexity,
        linear_acceleration: config.solver.linear_acceleration,
        outer_maximum: config.solver.outer_maximum,
        outer_dvclose: config.solver.outer_dvclose,
        inner_maximum: config.solver.inner_maximum,
        inner_dvclose: config.solver.inner_dvclose,
        ..Ims::default()
    };

    let grid = config.grid.to_grid();
    let mut gwf = GwfModel::new(name);
    gwf.save_flows = config.model.save_flows;
    if config.model.newton {
        gwf.newton = Some(NewtonOptions {
            under_relaxation: config.model.under_relaxation,
        });
    }

    gwf.ic = Some(Ic::new(GridArray::Constant(config.aquifer.initial_head)));
    let mut npf = Npf::new(
        GridArray::Constant(config.aquifer.icelltype),
        GridArray::Constant(config.aquifer.k),
    );
    npf.save_specific_discharge = config.aquifer.save_specific_discharge;
    gwf.npf = Some(npf);

    let heads = boundary_records(config);
    if !heads.is_empty() {
        debug!("{} constant-head cells", heads.len());
        gwf.chd = Some(Chd::new(heads));
    }

    let wells: Vec<WellRecord> = config
        .wells
        .iter()
        .flat_map(|w| {
            point_source_in(w.layer, grid.nrow, grid.ncol, w.row_fraction, w.col_fraction, w.rate)
        })
        .collect();
    if !wells.is_empty() {
        for w in &wells {
            debug!("Well at {} with rate {}", w.cell, w.rate);
        }
        gwf.wel = Some(Wel::new(wells));
    }

    let output = &config.output;
    gwf.oc = Some(Oc {
        head_file: Some(config.head_file()),
        budget_file: Some(config.budget_file()),
        save: vec![
            (OutputKind::Head, output.save_head),
            (OutputKind::Budget, output.save_budget),
        ],
        print: output
            .print_head
            .map(|f| vec![(OutputKind::Head, f)])
            .unwrap_or_default(),
        ..Oc::default()
    });

    let mut dis = Dis::new(grid);
    dis.length_units = config.grid.length_units.as_ref().map(|u| u.to_lowercase());
    gwf.dis = Some(dis);
    sim.add_model(gwf)?;
    Ok(sim)
}

/// Perimeter ring first, then the explicitly listed cells.
fn boundary_records(config: &Config) -> Vec<HeadRecord> {
    let boundary = &config.boundary;
    let mut records = match boundary.perimeter_head {
        Some(head) => constant_head_ring(
            boundary.perimeter_layer,
            config.grid.nrow,
            config.grid.ncol,
            head,
        ),
        None => Vec::new(),
    };
    records.extend(
        boundary
            .cells
            .iter()
            .map(|c| HeadRecord::new(CellId::new(c.layer, c.row, c.col), c.head)),
    );
    records
}
