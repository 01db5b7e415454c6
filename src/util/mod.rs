// SPDX-License-Identifier: GPL-3.0-or-later
mod cycle;

pub(crate) use cycle::Cycle;
