use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/*
  ラウンド同期用の再利用可能なバリア

  std::sync::Barrier にはリーダーが見つかるが、リーダーの処理が終わる前に
  他のスレッドも解放されてしまう。ここでは最後に到着したスレッドが
  ロックを保持したまま `action` を1回だけ実行し、その後で全員を解放する。

  - action は全員が到着した後、誰かが解放される前に実行される
  - action はラウンドごとにちょうど1回、1つのスレッドだけが実行する
  - action 内の書き込みは、解放された全スレッドから見える (Mutexによる happens-before)
*/

struct BarrierState {
    arrived: usize,
    generation: u64,
}

pub struct RoundBarrier<F>
where
    F: Fn() + Sync,
{
    state: Mutex<BarrierState>,
    cvar: Condvar,
    parties: usize,
    action: F,
}

impl<F> RoundBarrier<F>
where
    F: Fn() + Sync,
{
    /// `parties` は1以上であること (0は1として扱う)
    pub fn new(parties: usize, action: F) -> Self {
        RoundBarrier {
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
            }),
            cvar: Condvar::new(),
            parties: parties.max(1),
            action,
        }
    }

    pub fn parties(&self) -> usize {
        self.parties
    }

    /// 全員が到着するまで待つ。action を実行したスレッド (コーディネーター) なら `true`。
    pub fn wait(&self) -> bool {
        let mut state = self.lock_state();
        let generation = state.generation;
        state.arrived += 1;

        if state.arrived == self.parties {
            (self.action)();
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.cvar.notify_all();
            return true;
        }

        // spurious wakeup に備えて世代が変わるまで待つ
        while state.generation == generation {
            state = self
                .cvar
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        false
    }

    fn lock_state(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
