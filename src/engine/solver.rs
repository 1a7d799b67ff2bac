// ==========================================
// 排班生成系统 - 求解器适配
// ==========================================
// 职责: 把 GenerationRequest 交给求解器，取回 SolverResult
// 实现:
// - ProcessSolver: 外部进程，stdin 写入 JSON 后关闭，进程退出后解析 stdout
// - InProcessSolver: 进程内函数（测试 / 内嵌求解库）
// 约束: 同步调用；超时与取消令牌对所有实现统一传入
// ==========================================

use crate::config::SolverConfig;
use crate::domain::generation::{GenerationRequest, SolverResult};
use crate::engine::error::GenerationError;
use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 等待子进程时的轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// 杀掉子进程后收集剩余 stderr 的最长等待
const DRAIN_GRACE: Duration = Duration::from_millis(500);

// ==========================================
// CancellationToken - 取消令牌
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

// ==========================================
// Solver Trait
// ==========================================

/// 求解器
///
/// # 实现说明
/// - 返回的 SolverResult 尚未经过状态判定
/// - 取消令牌被触发时应尽快返回 `GenerationError::SolverCancelled`
pub trait Solver: Send + Sync {
    /// 求解器名称（写入运行记录）
    fn name(&self) -> &str;

    fn solve(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<SolverResult, GenerationError>;
}

// ==========================================
// ProcessSolver - 外部进程求解器
// ==========================================
pub struct ProcessSolver {
    config: SolverConfig,
}

enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut(Duration),
    Cancelled,
}

impl ProcessSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    fn spawn(&self) -> Result<Child, GenerationError> {
        Command::new(&self.config.program)
            .args(&self.config.args)
            // 名字与角色可能含非 ASCII 字符，显式声明 UTF-8
            .env("PYTHONIOENCODING", "utf-8")
            .env("PYTHONUTF8", "1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GenerationError::SolverLaunch {
                program: self.config.program.clone(),
                reason: e.to_string(),
            })
    }

    /// 轮询等待子进程退出；超时或取消时杀掉进程
    fn wait_for_exit(
        &self,
        child: &mut Child,
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome, GenerationError> {
        let started_at = Instant::now();

        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(WaitOutcome::Exited(status)),
                Ok(None) => {
                    if cancel.is_cancelled() {
                        kill_and_reap(child);
                        return Ok(WaitOutcome::Cancelled);
                    }
                    if let Some(timeout) = self.config.timeout {
                        if started_at.elapsed() >= timeout {
                            kill_and_reap(child);
                            return Ok(WaitOutcome::TimedOut(timeout));
                        }
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    kill_and_reap(child);
                    return Err(GenerationError::SolverIo {
                        reason: format!("等待求解器进程失败: {}", e),
                    });
                }
            }
        }
    }
}

impl Solver for ProcessSolver {
    fn name(&self) -> &str {
        "process"
    }

    fn solve(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<SolverResult, GenerationError> {
        if cancel.is_cancelled() {
            return Err(GenerationError::SolverCancelled);
        }

        let payload = serde_json::to_vec(request).map_err(GenerationError::RequestEncode)?;
        let payload_len = payload.len();

        info!(
            program = %self.config.program,
            args = ?self.config.args,
            staff_count = request.staff_list.len(),
            days = request.days,
            start_date = %request.start_date,
            "启动求解器进程"
        );
        let started_at = Instant::now();
        let mut child = self.spawn()?;

        // stdout / stderr 由独立线程读空，避免管道写满导致双方互相等待
        let stdout_rx = spawn_reader(child.stdout.take());
        let stderr_rx = spawn_reader(child.stderr.take());

        // 写完 stdin 后 drop，向求解器发出输入结束
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || -> io::Result<()> {
                stdin.write_all(&payload)?;
                stdin.flush()
            })
        });

        let status = match self.wait_for_exit(&mut child, cancel)? {
            WaitOutcome::Exited(status) => status,
            WaitOutcome::TimedOut(timeout) => {
                let stderr = drain_lossy(&stderr_rx, Some(DRAIN_GRACE));
                warn!(
                    timeout_secs = timeout.as_secs(),
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    "求解器超时，已终止进程"
                );
                return Err(GenerationError::SolverTimeout {
                    timeout_secs: timeout.as_secs(),
                    stderr,
                });
            }
            WaitOutcome::Cancelled => {
                warn!("求解已取消，已终止求解器进程");
                return Err(GenerationError::SolverCancelled);
            }
        };

        let stderr = drain_lossy(&stderr_rx, None);
        if !stderr.is_empty() {
            debug!(stderr = %stderr, "求解器 stderr 输出");
        }

        if !status.success() {
            warn!(exit_code = ?status.code(), "求解器异常退出");
            return Err(GenerationError::SolverExit {
                exit_code: status.code(),
                stderr,
            });
        }

        let write_result = match writer {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                Err(io::Error::new(io::ErrorKind::Other, "stdin 写入线程异常退出"))
            }),
            None => Ok(()),
        };
        match write_result {
            Ok(()) => {}
            // 求解器未读完输入就正常退出，以退出码与 stdout 为准
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!(payload_bytes = payload_len, "求解器未读完 stdin 即正常退出");
            }
            Err(e) => {
                return Err(GenerationError::SolverIo {
                    reason: format!("写入求解器 stdin 失败: {}", e),
                });
            }
        }

        let stdout = match stdout_rx.recv() {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                return Err(GenerationError::SolverIo {
                    reason: format!("读取求解器 stdout 失败: {}", e),
                })
            }
            Err(_) => {
                return Err(GenerationError::SolverIo {
                    reason: "stdout 读取线程异常退出".to_string(),
                })
            }
        };

        let result: SolverResult =
            serde_json::from_slice(&stdout).map_err(|e| GenerationError::ResponseDecode {
                reason: e.to_string(),
                raw_output: String::from_utf8_lossy(&stdout).into_owned(),
            })?;

        info!(
            status = %result.status,
            scheduled_staff = result.schedule.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "求解器进程完成"
        );

        Ok(result)
    }
}

fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(error = %e, "终止求解器进程失败（可能已退出）");
    }
    if let Err(e) = child.wait() {
        warn!(error = %e, "回收求解器进程失败");
    }
}

fn spawn_reader<R>(source: Option<R>) -> Receiver<io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = match source {
            Some(mut reader) => reader.read_to_end(&mut buf).map(|_| buf),
            None => Ok(buf),
        };
        let _ = tx.send(result);
    });
    rx
}

/// 取出读取线程的内容（按 UTF-8 宽松解码）；grace 为 None 时阻塞等待
fn drain_lossy(rx: &Receiver<io::Result<Vec<u8>>>, grace: Option<Duration>) -> String {
    let received = match grace {
        Some(grace) => rx.recv_timeout(grace).ok(),
        None => rx.recv().ok(),
    };
    match received {
        Some(Ok(bytes)) => String::from_utf8_lossy(&bytes).trim().to_string(),
        _ => String::new(),
    }
}

// ==========================================
// InProcessSolver - 进程内求解器
// ==========================================

type SolveFn = dyn Fn(&GenerationRequest) -> Result<SolverResult, String> + Send + Sync;

/// 进程内求解器
///
/// 函数在调用线程上同步执行，无法被中途打断；
/// 取消令牌在调用前后检查
pub struct InProcessSolver {
    name: String,
    solve_fn: Box<SolveFn>,
}

impl InProcessSolver {
    pub fn new<F>(name: impl Into<String>, solve_fn: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<SolverResult, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            solve_fn: Box::new(solve_fn),
        }
    }
}

impl Solver for InProcessSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<SolverResult, GenerationError> {
        if cancel.is_cancelled() {
            return Err(GenerationError::SolverCancelled);
        }

        let result = (self.solve_fn)(request).map_err(|reason| GenerationError::SolverFailed {
            solver: self.name.clone(),
            reason,
        })?;

        if cancel.is_cancelled() {
            return Err(GenerationError::SolverCancelled);
        }
        Ok(result)
    }
}
