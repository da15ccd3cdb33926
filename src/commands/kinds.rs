use crate::processes::KINDS;
use crate::ui;

pub fn run() {
    ui::header("Process kinds");
    for (kind, description) in KINDS {
        ui::kv(kind, description);
    }
}
