use tokio::process::{Child, Command};

use crate::proc::ProcConfig;

pub fn cmd_program(cfg: &ProcConfig) -> Command {
    let mut cmd = Command::new(&cfg.program);
    cmd.args(cfg.args.iter().map(|s| s.as_str()));
    if let Some(cwd) = &cfg.cwd {
        cmd.current_dir(cwd);
    }
    for (k, v) in &cfg.env {
        cmd.env(k, v);
    }
    cmd.kill_on_drop(true);
    cmd
}

pub async fn kill_graceful(child: &mut Child) -> std::io::Result<()> {
    child.start_kill()?;
    child.wait().await.map(|_| ())
}
