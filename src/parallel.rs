use std::thread;
use std::sync::mpsc;
use std::sync::Mutex;

use log::{ debug, info, trace };

use crate::color::Color;
use crate::world::World;
use crate::camera::Camera;
use crate::canvas::Canvas;

/// A job sent to a render worker.
pub enum Message {
    /// Render one row of the image.
    Row(usize),
    Terminate,
}

/// A render worker.
///
/// Workers pull rows off a shared queue until they are told to stop, and
/// send each finished row back to the thread that owns the canvas. The
/// world and camera are only borrowed; nothing is written to them.
struct Worker<'a> {
    id: usize,
    world: &'a World,
    camera: &'a Camera,
    depth: usize,
}

impl<'a> Worker<'a> {
    fn run(&self, jobs: &Mutex<mpsc::Receiver<Message>>,
        rows: mpsc::Sender<(usize, Vec<Color>)>) {
        loop {
            // A poisoned queue means another worker died; stop as well.
            let message = match jobs.lock() {
                Ok(receiver) => receiver.recv(),
                Err(_) => break,
            };

            match message {
                Ok(Message::Row(y)) => {
                    trace!("Worker {} rendering row {}", self.id, y);
                    let row = self.camera.render_row(self.world, self.depth, y);

                    if rows.send((y, row)).is_err() {
                        break;
                    }
                },

                Ok(Message::Terminate) | Err(_) => break,
            }
        }

        debug!("Worker {} finished", self.id);
    }
}

/// Renders `world` through `camera` on `threads` scoped worker threads.
///
/// At least one worker is always used. Rows are independent, so the result
/// is the same as a serial render.
pub fn render(camera: &Camera, world: &World, depth: usize, threads: usize)
    -> Canvas {
    let threads = threads.max(1);
    info!("Rendering {}x{} on {} threads, depth {}",
        camera.hsize, camera.vsize, threads, depth);

    let (job_sender, job_receiver) = mpsc::channel();
    let job_receiver = Mutex::new(job_receiver);
    let (row_sender, row_receiver) = mpsc::channel();

    let mut canvas = Canvas::new(camera.hsize, camera.vsize);

    thread::scope(|scope| {
        for id in 0..threads {
            let worker = Worker { id, world, camera, depth };
            let jobs = &job_receiver;
            let rows = row_sender.clone();

            scope.spawn(move || worker.run(jobs, rows));
        }

        // Only the workers hold row senders now, so the loop below ends
        // once every worker has stopped.
        drop(row_sender);

        for y in 0..camera.vsize {
            let _ = job_sender.send(Message::Row(y));
        }
        for _ in 0..threads {
            let _ = job_sender.send(Message::Terminate);
        }

        for (y, row) in row_receiver {
            canvas.write_row(y, &row);
        }
    });

    canvas
}
