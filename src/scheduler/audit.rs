//! Hard-rule audit of a finished roster.
//!
//! Shared by both strategies: the greedy path attaches the findings as
//! warnings, the optimizing path should produce none (except idle
//! weekdays when weekday presence is only preferred).

use crate::models::{Assignment, Day, Duty, Employee, LeaveBook, RuleConfig, Violation};

/// Checks a roster against the rules and returns every breach found.
///
/// Checks, per day and shift: exact coverage, shift lead presence, role
/// restrictions; per employee: idle weekdays, adjacent idle days, streak
/// length, rest blocks, forbidden successions, and (when enabled) daily
/// shift-lead presence.
pub fn audit(
    assignment: &Assignment,
    employees: &[Employee],
    rules: &RuleConfig,
    leaves: &LeaveBook,
) -> Vec<Violation> {
    let mut found = Vec::new();
    let days = &assignment.days;
    let k = rules.rest.max_consecutive_days as usize;
    let m = rules.rest.mandatory_rest_days as usize;

    let could_work = |emp: &Employee, day: &Day| {
        rules
            .running_shifts(day.day_type())
            .iter()
            .any(|(_, s, _)| emp.can_work(&s.code, day.day_type()))
    };

    for (d, day) in days.iter().enumerate() {
        for shift in &rules.shifts {
            let required = rules.required_on(day, &shift.code);
            let on_shift = assignment.assigned(d, &shift.code);
            if on_shift.len() as u32 != required {
                found.push(Violation::coverage(&shift.code, day.date, required, on_shift.len() as u32));
            }
            if required > 0
                && rules.lead_presence.every_shift
                && !on_shift.iter().any(|&e| employees[e].is_shift_lead())
            {
                found.push(Violation::missing_shift_lead(&shift.code, day.date));
            }
        }
    }

    for (e, emp) in employees.iter().enumerate() {
        let row = &assignment.duties[e];
        let mut streak = 0usize;
        let mut block_left = 0usize;

        for (d, day) in days.iter().enumerate() {
            let duty = &row[d];
            let on_leave = leaves.is_on_leave(&emp.id, day.date);

            if let Some(code) = duty.shift_code() {
                if !emp.can_work(code, day.day_type()) {
                    found.push(Violation::role(
                        &emp.id,
                        day.date,
                        format!("{} may not work {code} on {}", emp.id, day.weekday_name()),
                    ));
                }
                if on_leave {
                    found.push(Violation::role(
                        &emp.id,
                        day.date,
                        format!("{} works {code} during approved leave", emp.id),
                    ));
                }
                if block_left > 0 {
                    found.push(Violation::rest_block_broken(&emp.id, day.date));
                    block_left = 0;
                }
                streak += 1;
                if streak == k + 1 {
                    found.push(Violation::streak_exceeded(&emp.id, day.date, streak as u32));
                }
                if d > 0 {
                    if let Some(prev) = row[d - 1].shift_code() {
                        if rules.rest.is_forbidden(prev, code) {
                            found.push(Violation::turnaround(&emp.id, day.date, prev, code));
                        }
                    }
                }
            } else {
                if streak >= k {
                    block_left = m;
                }
                block_left = block_left.saturating_sub(1);
                streak = 0;

                if *duty == Duty::Off && !day.is_weekend && could_work(emp, day) {
                    found.push(Violation::weekday_idle(&emp.id, day.date));
                }
                if rules.lead_presence.every_day
                    && emp.is_shift_lead()
                    && !on_leave
                    && could_work(emp, day)
                {
                    found.push(Violation::lead_absent(&emp.id, day.date));
                }
            }

            if d > 0 {
                let (prev_day, prev) = (&days[d - 1], &row[d - 1]);
                let both_idle = !prev.is_working() && !duty.is_working();
                let exempt = (prev_day.is_weekend && day.is_weekend)
                    || *prev == Duty::Leave
                    || *duty == Duty::Leave
                    || (*prev == Duty::Rest && *duty == Duty::Rest)
                    || !(could_work(emp, prev_day) || could_work(emp, day));
                if both_idle && !exempt {
                    found.push(Violation::consecutive_off(&emp.id, day.date));
                }
            }
        }
    }

    found
}
